use super::screen_observation;
use crate::agent::{Agent, Phase, ScreenAgent, ScreenAgentBuilder};
use crate::config::{ActionMode, AgentConfig, TargetSync};
use crate::error::DqnError;
use crate::network::{MultiHeadNetwork, QFunction};
use crate::optimizer::{OptimizerWrapper, SGD};
use crate::types::{AgentAction, StepType};

const SIZE: usize = 8;

fn config() -> AgentConfig {
    AgentConfig {
        screen_width: SIZE,
        screen_height: SIZE,
        hidden_sizes: vec![16],
        batch_size: 4,
        replay_capacity: 100,
        learning_rate: 1e-3,
        action_mode: ActionMode::Compass { step: 1 },
        target_sync: TargetSync::Episodes(1),
        seed: Some(3),
        ..AgentConfig::default()
    }
}

fn agent(config: AgentConfig) -> ScreenAgent {
    ScreenAgentBuilder::new().config(config).build().unwrap()
}

const BEACON: (usize, usize) = (6, 4);

/// First, two mid steps approaching the beacon, then the terminal step on it.
fn play_episode(agent: &mut ScreenAgent) -> Vec<AgentAction> {
    let steps = [
        (StepType::First, (1, 4)),
        (StepType::Mid, (2, 4)),
        (StepType::Mid, (3, 4)),
        (StepType::Last, (6, 4)),
    ];
    steps
        .iter()
        .map(|&(step_type, marine)| {
            agent
                .decide(&screen_observation(step_type, SIZE, SIZE, Some(BEACON), Some(marine)))
                .unwrap()
        })
        .collect()
}

#[test]
fn test_episode_state_machine() {
    let mut agent = agent(config());
    assert_eq!(agent.phase(), Phase::AwaitingFirst);

    let actions = play_episode(&mut agent);
    assert_eq!(actions[0], AgentAction::Select);
    assert!(!actions[1].is_reset());
    assert!(!actions[2].is_reset());
    assert_eq!(actions[3], AgentAction::Reset);

    assert_eq!(agent.phase(), Phase::Terminal);
    assert_eq!(agent.episodes(), 1);
    assert_eq!(agent.total_steps(), 4);
}

#[test]
fn test_transitions_and_shaped_rewards() {
    let mut agent = agent(config());
    play_episode(&mut agent);

    let stored: Vec<_> = agent.replay().iter().collect();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].step_type, StepType::First);
    assert_eq!(stored[1].step_type, StepType::Last);
    // distance 4 -> 3, then 3 -> 0
    assert_eq!(stored[0].reward, 1.0);
    assert_eq!(stored[1].reward, 3.0);
    assert_eq!(stored[0].state.len(), SIZE * SIZE);
    assert_eq!(stored[0].action.len(), 1);
}

#[test]
fn test_only_mid_steps_are_decisions() {
    let mut agent = agent(config());
    play_episode(&mut agent);
    assert_eq!(agent.policy().steps_done(), 2);
}

#[test]
fn test_supervised_episode() {
    let mut agent = agent(AgentConfig { supervised_episodes: 1, ..config() });
    assert!(agent.is_supervised());

    let actions = play_episode(&mut agent);
    // the beacon is to the right of the marine
    assert_eq!(actions[1], AgentAction::Move { dx: 1, dy: 0 });
    assert_eq!(actions[2], AgentAction::Move { dx: 1, dy: 0 });
    assert_eq!(agent.policy().steps_done(), 0);
    assert!(!agent.is_supervised());

    play_episode(&mut agent);
    assert_eq!(agent.policy().steps_done(), 2);
}

#[test]
fn test_target_sync_every_episode() {
    let mut agent = agent(config());
    play_episode(&mut agent);
    play_episode(&mut agent);
    assert_eq!(agent.estimator().syncs(), 2);
}

#[test]
fn test_learning_starts_with_full_batch() {
    let mut agent = agent(AgentConfig { batch_size: 2, ..config() });
    assert!(matches!(agent.learn(), Err(DqnError::InsufficientData { .. })));

    play_episode(&mut agent);
    assert_eq!(agent.optimizer_steps(), 1);
    assert!(agent.learn().unwrap().is_finite());
    assert_eq!(agent.optimizer_steps(), 2);
}

#[test]
fn test_sync_on_optimizer_steps() {
    let mut agent = agent(AgentConfig {
        batch_size: 1,
        target_sync: TargetSync::OptimizerSteps(2),
        ..config()
    });
    play_episode(&mut agent);
    assert_eq!(agent.optimizer_steps(), 2);
    assert_eq!(agent.estimator().syncs(), 1);
}

#[test]
fn test_wrong_screen_size() {
    let mut agent = agent(config());
    let observation = screen_observation(StepType::First, SIZE + 1, SIZE, Some(BEACON), None);
    assert!(matches!(agent.decide(&observation), Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_mid_step_without_first_restarts() {
    let mut agent = agent(config());
    let observation = screen_observation(StepType::Mid, SIZE, SIZE, Some(BEACON), Some((1, 1)));
    assert_eq!(agent.decide(&observation).unwrap(), AgentAction::Select);
    assert_eq!(agent.phase(), Phase::Acting);
}

fn observe(agent: &mut ScreenAgent, step_type: StepType, marine: (usize, usize)) -> AgentAction {
    agent
        .decide(&screen_observation(step_type, SIZE, SIZE, Some(BEACON), Some(marine)))
        .unwrap()
}

#[test]
fn test_restart_closes_unfinished_episode() {
    let mut agent = agent(config());
    observe(&mut agent, StepType::First, (1, 4));
    observe(&mut agent, StepType::Mid, (2, 4));
    observe(&mut agent, StepType::Mid, (3, 4));

    play_episode(&mut agent);
    assert_eq!(agent.episodes(), 2);
    assert_eq!(agent.estimator().syncs(), 2);

    let history = agent.metrics().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].steps, 3);
    assert_eq!(history[1].steps, 4);
    assert_eq!(history[1].shaped_return, 4.0);
}

#[test]
fn test_end_episode_drops_pending_step() {
    let mut agent = agent(config());
    agent.end_episode().unwrap();
    assert_eq!(agent.episodes(), 0);

    observe(&mut agent, StepType::First, (1, 4));
    observe(&mut agent, StepType::Mid, (2, 4));
    agent.end_episode().unwrap();
    assert_eq!(agent.episodes(), 1);
    assert_eq!(agent.phase(), Phase::Terminal);
    assert!(agent.replay().is_empty());
    assert_eq!(agent.metrics().last().unwrap().steps, 2);

    agent.end_episode().unwrap();
    assert_eq!(agent.episodes(), 1);
    assert_eq!(observe(&mut agent, StepType::First, (1, 4)), AgentAction::Select);
}

#[test]
fn test_lone_last_observation_counts_as_episode() {
    let mut agent = agent(config());
    assert_eq!(observe(&mut agent, StepType::Last, (6, 4)), AgentAction::Reset);
    assert_eq!(agent.episodes(), 1);
    assert_eq!(agent.phase(), Phase::Terminal);
    assert_eq!(agent.metrics().last().unwrap().steps, 1);
    assert!(agent.replay().is_empty());
}

#[test]
fn test_build_with_checks_network() {
    let config = config();
    let wrong_heads = MultiHeadNetwork::new_seeded(SIZE * SIZE, &[8], &[3, 8, 8], OptimizerWrapper::SGD(SGD::new()), 1).unwrap();
    assert!(ScreenAgentBuilder::new().config(config.clone()).build_with(wrong_heads).is_err());

    let wrong_input = MultiHeadNetwork::new_seeded(10, &[8], &[4], OptimizerWrapper::SGD(SGD::new()), 1).unwrap();
    assert!(ScreenAgentBuilder::new().config(config.clone()).build_with(wrong_input).is_err());

    let network = MultiHeadNetwork::new_seeded(SIZE * SIZE, &[8], &[4], OptimizerWrapper::SGD(SGD::new()), 1).unwrap();
    let agent = ScreenAgentBuilder::new().config(config).build_with(network).unwrap();
    assert_eq!(agent.estimator().head_sizes(), vec![4]);
}

#[test]
fn test_screen_point_mode_heads() {
    let agent = agent(AgentConfig { action_mode: ActionMode::ScreenPoint, ..config() });
    assert_eq!(agent.estimator().head_sizes(), vec![3, SIZE, SIZE]);
    assert!(!agent.is_supervised());
}

#[test]
fn test_metrics_recorded() {
    let mut agent = agent(config());
    play_episode(&mut agent);

    let summary = agent.metrics().last().unwrap();
    assert_eq!(summary.episode, 1);
    assert_eq!(summary.steps, 4);
    assert_eq!(summary.shaped_return, 4.0);
    assert_eq!(summary.optimizer_steps, 0);
    assert_eq!(agent.metrics().mean_score(10), Some(0.0));
}

#[test]
fn test_estimator_input_matches_screen() {
    let agent = agent(config());
    let network = MultiHeadNetwork::new_seeded(SIZE * SIZE, &[], &[4], OptimizerWrapper::SGD(SGD::new()), 0).unwrap();
    assert_eq!(agent.estimator().input_size(), network.input_size());
}
