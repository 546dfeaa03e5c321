use ndarray::array;

use crate::optimizer::{Adam, Optimizer, SGD};

#[test]
fn test_sgd_step() {
    let mut sgd = SGD::new();
    let mut weights = array![[1.0, 2.0]];
    let mut biases = array![0.5];

    sgd.begin_step();
    sgd.update_weights(0, &mut weights, &array![[0.5, -1.0]], 0.1);
    sgd.update_biases(0, &mut biases, &array![1.0], 0.1);

    assert!((weights[[0, 0]] - 0.95).abs() < 1e-6);
    assert!((weights[[0, 1]] - 2.1).abs() < 1e-6);
    assert!((biases[0] - 0.4).abs() < 1e-6);
}

#[test]
fn test_adam_first_step_is_learning_rate_sized() {
    let mut adam = Adam::default();
    let mut weights = array![[1.0, 1.0]];

    adam.begin_step();
    adam.update_weights(0, &mut weights, &array![[0.5, -2.0]], 0.01);

    // With bias correction the first step moves every weight by ~lr
    assert!((weights[[0, 0]] - 0.99).abs() < 1e-4);
    assert!((weights[[0, 1]] - 1.01).abs() < 1e-4);
    assert_eq!(adam.t, 1);
}

#[test]
fn test_adam_slots_are_independent() {
    let mut adam = Adam::default();
    let mut small = array![[0.0]];
    let mut large = array![[0.0, 0.0], [0.0, 0.0]];
    let mut biases = array![0.0, 0.0, 0.0];

    for _ in 0..3 {
        adam.begin_step();
        adam.update_weights(0, &mut small, &array![[1.0]], 0.1);
        adam.update_weights(1, &mut large, &array![[-1.0, -1.0], [-1.0, -1.0]], 0.1);
        adam.update_biases(1, &mut biases, &array![1.0, 1.0, 1.0], 0.1);
    }

    assert!(small[[0, 0]] < 0.0);
    assert!(large.iter().all(|&w| w > 0.0));
    assert!(biases.iter().all(|&b| b < 0.0));
    assert_eq!(adam.t, 3);
}
