use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::{EpochStats, TrainReport};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_epoch;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` on `dataset` (already normalized) with online gradient
/// descent.
///
/// # Arguments
/// - `network` — mutable reference to the network; training continues from
///               its current parameters, it is never reinitialized
/// - `dataset` — normalized samples matching the network's widths
/// - `config`  — epoch budget, learning rate, error goal, order, progress
///
/// # Stopping
/// At least one full epoch always runs. After each epoch the average error
/// is compared to `config.error_goal`; the loop stops as soon as it is
/// strictly below the goal, otherwise after `config.epochs` epochs.
///
/// # Errors
/// `Config` for an invalid configuration, `Data` for an empty dataset,
/// `Dimension` when the dataset widths do not match the network.
pub fn train_loop(network: &mut Network, dataset: &Dataset, config: &TrainConfig) -> Result<TrainReport> {
    config.validate()?;
    let optimizer = Sgd::new(config.learning_rate)?;
    if dataset.is_empty() {
        return Err(NetError::Data("cannot train on an empty dataset".into()));
    }
    NetError::check_len("dataset inputs", network.num_inputs(), dataset.num_inputs())?;
    NetError::check_len("dataset targets", network.num_outputs(), dataset.num_outputs())?;

    info!(
        samples = dataset.len(),
        epochs = config.epochs,
        learning_rate = config.learning_rate,
        error_goal = config.error_goal,
        "training started"
    );

    let mut order: Vec<usize> = (0..dataset.len()).collect();
    let mut rng = config.shuffle_seed.map(StdRng::seed_from_u64);
    let mut report = TrainReport {
        epochs_run: 0,
        final_error: f64::INFINITY,
        goal_reached: false,
    };

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        if let Some(rng) = rng.as_mut() {
            order.shuffle(rng);
        }

        // ── One full pass over the training data ───────────────────────────
        let avg_error = train_epoch(network, dataset, &optimizer, &order)?;
        report.epochs_run = epoch;
        report.final_error = avg_error;

        // ── Emit progress ─────────────────────────────────────────────────
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            avg_error,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        debug!(epoch, total = config.epochs, avg_error, "epoch finished");
        if let Some(ref tx) = config.progress_tx {
            // The observer may have gone away; training does not depend on it.
            let _ = tx.send(stats);
        }

        if avg_error < config.error_goal {
            report.goal_reached = true;
            info!(epoch, avg_error, "error goal reached");
            break;
        }
    }

    info!(
        epochs_run = report.epochs_run,
        final_error = report.final_error,
        goal_reached = report.goal_reached,
        "training finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::spec::NetworkSpec;
    use std::sync::mpsc;

    fn two_samples() -> Dataset {
        Dataset::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]], vec![vec![0.0], vec![1.0]]).unwrap()
    }

    fn linear_net(seed: u64) -> Network {
        let spec = NetworkSpec::from_names(2, vec![], &[] as &[&str], 1, "linear").unwrap();
        Network::new(&spec, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn converges_and_stops_at_goal() {
        let mut net = linear_net(11);
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig::new(5000, 0.05, 1e-4).with_progress(tx);
        let report = train_loop(&mut net, &two_samples(), &config).unwrap();

        assert!(report.goal_reached);
        assert!(report.final_error < 1e-4);
        assert!(report.epochs_run < 5000);

        let stats: Vec<EpochStats> = rx.try_iter().collect();
        assert_eq!(stats.len(), report.epochs_run);
        assert_eq!(stats.last().unwrap().avg_error, report.final_error);
        // Every epoch before the last one missed the goal.
        assert!(stats[..stats.len() - 1].iter().all(|s| s.avg_error >= 1e-4));
        // Epoch averages trend down.
        assert!(stats.last().unwrap().avg_error < stats[0].avg_error);
        let tenth = stats.len() / 10;
        if tenth > 0 {
            assert!(stats[tenth * 9].avg_error <= stats[tenth].avg_error);
        }
    }

    #[test]
    fn runs_whole_budget_when_goal_is_unreachable() {
        let mut net = linear_net(2);
        let report = train_loop(&mut net, &two_samples(), &TrainConfig::new(7, 0.01, 0.0)).unwrap();
        assert_eq!(report.epochs_run, 7);
        assert!(!report.goal_reached);
    }

    #[test]
    fn always_completes_one_epoch() {
        let mut net = linear_net(2);
        let report = train_loop(&mut net, &two_samples(), &TrainConfig::new(10, 0.01, f64::INFINITY)).unwrap();
        assert_eq!(report.epochs_run, 1);
        assert!(report.goal_reached);
    }

    #[test]
    fn continues_from_current_parameters() {
        let ds = two_samples();
        let config = TrainConfig::new(20, 0.05, 0.0);

        let mut once = linear_net(4);
        train_loop(&mut once, &ds, &TrainConfig::new(40, 0.05, 0.0)).unwrap();

        let mut twice = linear_net(4);
        train_loop(&mut twice, &ds, &config).unwrap();
        train_loop(&mut twice, &ds, &config).unwrap();

        assert_eq!(once.output.weights, twice.output.weights);
        assert_eq!(once.output.biases, twice.output.biases);
    }

    #[test]
    fn shuffled_runs_are_reproducible() {
        let ds = Dataset::new(
            (0..8).map(|i| vec![i as f64 / 8.0, 1.0 - i as f64 / 8.0]).collect(),
            (0..8).map(|i| vec![(i % 2) as f64]).collect(),
        )
        .unwrap();
        let spec = NetworkSpec::from_names(2, vec![3], &["tanh"], 1, "sigmoid").unwrap();
        let config = TrainConfig::new(15, 0.1, 0.0).with_shuffle(99);

        let mut a = Network::new(&spec, &mut StdRng::seed_from_u64(1)).unwrap();
        let mut b = Network::new(&spec, &mut StdRng::seed_from_u64(1)).unwrap();
        let ra = train_loop(&mut a, &ds, &config).unwrap();
        let rb = train_loop(&mut b, &ds, &config).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a.hidden[0].weights, b.hidden[0].weights);
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut net = linear_net(0);
        let ds = two_samples();
        assert!(matches!(train_loop(&mut net, &ds, &TrainConfig::new(0, 0.1, 0.0)), Err(NetError::Config(_))));
        assert!(matches!(train_loop(&mut net, &ds, &TrainConfig::new(5, 0.0, 0.0)), Err(NetError::Config(_))));

        let empty = Dataset::new(vec![], vec![]).unwrap();
        assert!(matches!(train_loop(&mut net, &empty, &TrainConfig::new(5, 0.1, 0.0)), Err(NetError::Data(_))));

        let wide = Dataset::new(vec![vec![0.0; 3]], vec![vec![0.0]]).unwrap();
        assert!(matches!(
            train_loop(&mut net, &wide, &TrainConfig::new(5, 0.1, 0.0)),
            Err(NetError::Dimension { .. })
        ));
    }
}
