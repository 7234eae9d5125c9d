use crate::{
    data::dataset::Dataset,
    error::{NetError, Result},
    loss::squared::SquaredError,
    network::network::Network,
    optim::sgd::Sgd,
};

/// Runs one online pass over `dataset` in the order given by `order`
/// (indices into the dataset) and returns the average per-sample error.
///
/// Each sample's error is measured on the forward pass taken *before* its
/// own update. An index past the end of the dataset is a `Data` error and
/// leaves the network untouched.
pub fn train_epoch(
    network: &mut Network,
    dataset: &Dataset,
    optimizer: &Sgd,
    order: &[usize],
) -> Result<f64> {
    if order.is_empty() {
        return Err(NetError::Data("cannot train on an empty dataset".into()));
    }
    if let Some(&idx) = order.iter().find(|&&i| i >= dataset.len()) {
        return Err(NetError::Data(format!(
            "sample index {} is out of range for a dataset of {} samples",
            idx,
            dataset.len()
        )));
    }

    let mut total_error = 0.0;

    for &idx in order {
        let (input, expected) = dataset.sample(idx);

        // Forward pass
        let pass = network.forward(input)?;

        // Accumulate error
        total_error += SquaredError::loss(&pass.output, expected);

        // Backward pass and update
        optimizer.step(network, input, expected, &pass)?;
    }

    Ok(total_error / order.len() as f64)
}

/// `train_epoch` over every sample in dataset order.
pub fn train_network(network: &mut Network, dataset: &Dataset, optimizer: &Sgd) -> Result<f64> {
    let order: Vec<usize> = (0..dataset.len()).collect();
    train_epoch(network, dataset, optimizer, &order)
}
