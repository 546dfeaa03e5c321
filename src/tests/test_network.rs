use ndarray::{array, Array2};

use crate::error::DqnError;
use crate::loss::MeanSquaredError;
use crate::network::{MultiHeadNetwork, QFunction};
use crate::optimizer::{Adam, OptimizerWrapper, SGD};

#[test]
fn test_network_shapes() {
    let network = MultiHeadNetwork::new_seeded(6, &[16, 8], &[3, 6, 4], OptimizerWrapper::SGD(SGD::new()), 1).unwrap();
    assert_eq!(network.input_size(), 6);
    assert_eq!(network.head_sizes(), vec![3, 6, 4]);

    let values = network.predict_batch(Array2::zeros((5, 6)).view()).unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0].dim(), (5, 3));
    assert_eq!(values[1].dim(), (5, 6));
    assert_eq!(values[2].dim(), (5, 4));
}

#[test]
fn test_network_rejects_bad_sizes() {
    let sgd = || OptimizerWrapper::SGD(SGD::new());
    assert!(MultiHeadNetwork::new(0, &[4], &[2], sgd()).is_err());
    assert!(MultiHeadNetwork::new(4, &[4], &[], sgd()).is_err());
    assert!(MultiHeadNetwork::new(4, &[0], &[2], sgd()).is_err());
    assert!(MultiHeadNetwork::new(4, &[4], &[2, 0], sgd()).is_err());
}

#[test]
fn test_predict_wrong_input_width() {
    let network = MultiHeadNetwork::new_seeded(4, &[8], &[2], OptimizerWrapper::SGD(SGD::new()), 2).unwrap();
    assert!(matches!(
        network.predict_batch(Array2::zeros((1, 3)).view()),
        Err(DqnError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_seeded_networks_match() {
    let a = MultiHeadNetwork::new_seeded(4, &[8], &[2, 2], OptimizerWrapper::SGD(SGD::new()), 9).unwrap();
    let b = MultiHeadNetwork::new_seeded(4, &[8], &[2, 2], OptimizerWrapper::SGD(SGD::new()), 9).unwrap();
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_snapshot_restore() {
    let source = MultiHeadNetwork::new_seeded(3, &[5], &[2, 4], OptimizerWrapper::SGD(SGD::new()), 3).unwrap();
    let mut copy = MultiHeadNetwork::new_seeded(3, &[5], &[2, 4], OptimizerWrapper::SGD(SGD::new()), 4).unwrap();
    assert_ne!(source.snapshot(), copy.snapshot());

    copy.restore(&source.snapshot()).unwrap();
    let states = array![[0.1, 0.2, 0.3], [-1.0, 0.0, 1.0]];
    assert_eq!(copy.predict_batch(states.view()).unwrap(), source.predict_batch(states.view()).unwrap());

    let mut other = MultiHeadNetwork::new_seeded(3, &[5, 5], &[2, 4], OptimizerWrapper::SGD(SGD::new()), 4).unwrap();
    assert!(other.restore(&source.snapshot()).is_err());
}

#[test]
fn test_backward_needs_every_head() {
    let mut network = MultiHeadNetwork::new_seeded(2, &[4], &[2, 3], OptimizerWrapper::SGD(SGD::new()), 5).unwrap();
    let states = array![[0.5, -0.5]];
    network.forward_batch(states.view()).unwrap();
    let result = network.backward_step(&[Array2::zeros((1, 2))], 0.1);
    assert!(matches!(result, Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_backward_before_forward() {
    let mut network = MultiHeadNetwork::new_seeded(2, &[4], &[2], OptimizerWrapper::SGD(SGD::new()), 6).unwrap();
    assert!(network.backward_step(&[Array2::zeros((1, 2))], 0.1).is_err());
}

fn regression_loss(network: &mut MultiHeadNetwork, steps: usize, learning_rate: f32) -> (f32, f32) {
    let states = array![[0.5, -0.5], [1.0, 0.25]];
    let targets = array![[1.0, -1.0], [0.5, 2.0]];

    let mut first = None;
    let mut last = 0.0;
    for _ in 0..steps {
        let values = network.forward_batch(states.view()).unwrap();
        let predicted = values[0].iter().copied().collect::<ndarray::Array1<f32>>();
        let target = targets.iter().copied().collect::<ndarray::Array1<f32>>();
        let loss = MeanSquaredError::compute(predicted.view(), target.view()).unwrap();
        let gradient = MeanSquaredError::gradient(predicted.view(), target.view()).unwrap();
        let gradient = gradient.into_shape((2, 2)).unwrap();
        network.backward_step(&[gradient], learning_rate).unwrap();
        first.get_or_insert(loss);
        last = loss;
    }
    (first.unwrap(), last)
}

#[test]
fn test_linear_regression_with_sgd() {
    let mut network = MultiHeadNetwork::new_seeded(2, &[], &[2], OptimizerWrapper::SGD(SGD::new()), 7).unwrap();
    let (first, last) = regression_loss(&mut network, 300, 0.1);
    assert!(last < first * 0.1, "loss went from {} to {}", first, last);
}

#[test]
fn test_linear_regression_with_adam() {
    let mut network = MultiHeadNetwork::new_seeded(2, &[], &[2], OptimizerWrapper::Adam(Adam::default()), 8).unwrap();
    let (first, last) = regression_loss(&mut network, 500, 0.05);
    assert!(last < first * 0.1, "loss went from {} to {}", first, last);
}
