use approx::assert_abs_diff_eq;
use quantum_nn::random::MatrixRng;
use quantum_nn::{
    loss, matrix, Activation, AdamConfig, AdamOptimizer, Error, FullyConnected, Layer,
    LayerOptimizer, Matrix, Network, NetworkOptimizer, ParameterGradients, ShapeError,
};

#[test]
fn test_config_defaults_and_validation() {
    let config = AdamConfig::default();
    assert_eq!(config.alpha, 1e-3);
    assert_eq!(config.beta1, 0.9);
    assert_eq!(config.beta2, 0.99);
    assert_eq!(config.epsilon, 1e-8);
    assert!(config.validate().is_ok());

    for bad in [
        config.with_alpha(0.0),
        config.with_beta1(1.0),
        config.with_beta2(-0.1),
        config.with_epsilon(f64::NAN),
    ] {
        assert!(matches!(bad.validate(), Err(Error::Configuration(_))));
        assert!(AdamOptimizer::new(Matrix::zeros(1, 1).unwrap(), bad).is_err());
    }
}

#[test]
fn test_fresh_state() {
    let opt = AdamOptimizer::new(matrix!([1, 2], [3, 4]), AdamConfig::default()).unwrap();
    assert!(opt.is_fresh());
    assert_eq!(opt.step_count(), 0);
    assert_eq!(opt.first_moment(), &Matrix::zeros(2, 2).unwrap());
    assert_eq!(opt.second_moment(), &Matrix::zeros(2, 2).unwrap());
}

#[test]
fn test_first_step_moves_by_alpha() {
    let config = AdamConfig::default().with_alpha(0.1);
    let mut opt = AdamOptimizer::new(matrix!([1, 2, 3]), config).unwrap();
    let params = opt.step(&matrix!([0.5, -4, 0])).unwrap().clone();

    assert_abs_diff_eq!(params.get(0, 0).unwrap(), 0.9, epsilon = 1e-6);
    assert_abs_diff_eq!(params.get(0, 1).unwrap(), 2.1, epsilon = 1e-6);
    assert_eq!(params.get(0, 2).unwrap(), 3.0);
    assert_eq!(opt.step_count(), 1);
    assert!(!opt.is_fresh());
}

#[test]
fn test_constant_gradient_steps_by_alpha() {
    let config = AdamConfig::default().with_alpha(0.01);
    let mut opt = AdamOptimizer::new(matrix!([0]), config).unwrap();
    for _ in 0..5 {
        let delta = opt.step_delta(&matrix!([2])).unwrap();
        assert_abs_diff_eq!(delta.get(0, 0).unwrap(), 0.01, epsilon = 1e-8);
    }
    assert_abs_diff_eq!(opt.parameters().get(0, 0).unwrap(), -0.05, epsilon = 1e-7);
    assert_abs_diff_eq!(opt.first_moment().get(0, 0).unwrap(), 2.0 * (1.0 - 0.9f64.powi(5)), epsilon = 1e-12);
    assert_abs_diff_eq!(opt.second_moment().get(0, 0).unwrap(), 4.0 * (1.0 - 0.99f64.powi(5)), epsilon = 1e-12);
}

#[test]
fn test_identical_optimizers_agree() {
    let mut rng = MatrixRng::seeded(4);
    let start = rng.gauss(3, 2, 0.0, 1.0).unwrap();
    let grads: Vec<_> = (0..10).map(|_| rng.gauss(3, 2, 0.0, 1.0).unwrap()).collect();

    let mut a = AdamOptimizer::new(start.clone(), AdamConfig::default()).unwrap();
    let mut b = AdamOptimizer::new(start, AdamConfig::default()).unwrap();
    for g in &grads {
        a.step(g).unwrap();
        b.step(g).unwrap();
    }
    assert_eq!(a, b);
}

#[test]
fn test_step_shape_error_keeps_state() {
    let mut opt = AdamOptimizer::new(Matrix::zeros(2, 2).unwrap(), AdamConfig::default()).unwrap();
    let before = opt.clone();
    assert!(matches!(
        opt.step(&Matrix::zeros(2, 1).unwrap()),
        Err(Error::Shape(ShapeError::Incompatible { .. }))
    ));
    assert_eq!(opt, before);
}

#[test]
fn test_layer_optimizer_tracks_layer() {
    let mut rng = MatrixRng::seeded(2);
    let mut layer = FullyConnected::new(3, 2, Activation::Relu, &mut rng).unwrap();
    let mut opt = LayerOptimizer::for_layer(&layer, AdamConfig::default()).unwrap();

    let grads = ParameterGradients {
        weights: Matrix::constant(2, 3, 1.0).unwrap(),
        biases: Matrix::constant(2, 1, -1.0).unwrap(),
    };
    opt.apply(&mut layer, &grads).unwrap();
    opt.apply(&mut layer, &grads).unwrap();

    assert_eq!(opt.weights().step_count(), 2);
    for (a, b) in layer.weights().iter().zip(opt.weights().parameters().iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
    for (a, b) in layer.biases().iter().zip(opt.biases().parameters().iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn test_layer_optimizer_rejects_bad_gradients() {
    let mut rng = MatrixRng::seeded(2);
    let mut layer = FullyConnected::new(3, 2, Activation::Relu, &mut rng).unwrap();
    let before = layer.clone();
    let mut opt = LayerOptimizer::for_layer(&layer, AdamConfig::default()).unwrap();

    let grads = ParameterGradients {
        weights: Matrix::zeros(2, 3).unwrap(),
        biases: Matrix::zeros(3, 1).unwrap(),
    };
    assert!(opt.apply(&mut layer, &grads).is_err());
    assert_eq!(layer, before);
    assert!(opt.weights().is_fresh());
}

#[test]
fn test_network_optimizer_gradient_count() {
    let mut rng = MatrixRng::seeded(8);
    let mut net = Network::from_layers([
        Box::new(FullyConnected::new(2, 3, Activation::Tanh, &mut rng).unwrap()) as Box<dyn Layer>,
        Box::new(FullyConnected::new(3, 1, Activation::Tanh, &mut rng).unwrap()),
    ])
    .unwrap();
    let mut opt = NetworkOptimizer::new(&net, AdamConfig::default()).unwrap();
    assert_eq!(opt.layers().len(), 2);
    assert!(matches!(opt.apply(&mut net, &[]), Err(Error::Configuration(_))));
}

#[test]
fn test_training_reduces_loss() {
    let mut rng = MatrixRng::seeded(1234);
    let mut net = Network::from_layers([
        Box::new(FullyConnected::new(2, 6, Activation::Tanh, &mut rng).unwrap()) as Box<dyn Layer>,
        Box::new(FullyConnected::new(6, 1, Activation::Tanh, &mut rng).unwrap()),
    ])
    .unwrap();
    let mut opt = NetworkOptimizer::new(&net, AdamConfig::default().with_alpha(0.01)).unwrap();

    let samples = [
        (vec![0.0, 1.0], 0.5),
        (vec![1.0, 0.0], -0.5),
        (vec![1.0, 1.0], 0.25),
    ];
    let data: Vec<(Matrix, Matrix)> = samples
        .iter()
        .map(|(x, y)| {
            (
                Matrix::column(x.clone()).unwrap(),
                Matrix::column(vec![*y]).unwrap(),
            )
        })
        .collect();

    let total_loss = |net: &Network| -> f64 {
        data.iter()
            .map(|(x, y)| loss::mse(y, &net.infer(x).unwrap()).unwrap())
            .sum()
    };

    let initial = total_loss(&net);
    for _ in 0..300 {
        for (x, y) in &data {
            let (out, trace) = net.forward(x).unwrap();
            let grads = net
                .backward(trace, &loss::mse_gradient(y, &out).unwrap())
                .unwrap();
            opt.apply(&mut net, &grads).unwrap();
        }
    }
    let trained = total_loss(&net);
    assert!(trained < initial * 0.1, "loss {initial} -> {trained}");
}

#[test]
fn test_network_optimizer_checks_every_layer_first() {
    let mut rng = MatrixRng::seeded(8);
    let mut net = Network::from_layers([
        Box::new(FullyConnected::new(2, 3, Activation::Tanh, &mut rng).unwrap()) as Box<dyn Layer>,
        Box::new(FullyConnected::new(3, 1, Activation::Tanh, &mut rng).unwrap()),
    ])
    .unwrap();
    let mut opt = NetworkOptimizer::new(&net, AdamConfig::default()).unwrap();
    let first_before = net.layer(0).unwrap().weights().clone();
    let opt_before = opt.clone();

    // last layer first; the last layer's weight gradient is misshaped
    let grads = [
        ParameterGradients {
            weights: Matrix::zeros(2, 2).unwrap(),
            biases: Matrix::zeros(1, 1).unwrap(),
        },
        ParameterGradients {
            weights: Matrix::constant(3, 2, 1.0).unwrap(),
            biases: Matrix::constant(3, 1, 1.0).unwrap(),
        },
    ];
    assert!(matches!(
        opt.apply(&mut net, &grads),
        Err(Error::Shape(ShapeError::Incompatible { .. }))
    ));
    assert_eq!(net.layer(0).unwrap().weights(), &first_before);
    assert_eq!(opt, opt_before);
    assert!(opt.layers()[0].weights().is_fresh());
}
