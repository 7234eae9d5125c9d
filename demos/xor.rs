use ferrite_mlp::{train_network, Dataset, Network, NetworkSpec, Sgd};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec = NetworkSpec::from_names(2, vec![4], &["tanh"], 1, "sigmoid")?;
    let mut network = Network::new(&spec, &mut StdRng::seed_from_u64(1))?;

    let dataset = Dataset::new(
        vec![
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ],
        vec![vec![1.0], vec![0.0], vec![1.0], vec![0.0]],
    )?;

    let optimizer = Sgd::new(0.5)?;
    let epochs = 10000;

    for epoch in 0..epochs {
        let error = train_network(&mut network, &dataset, &optimizer)?;
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: error = {error:.6}");
        }
    }

    for (input, _) in dataset.iter() {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)?[0]);
    }
    Ok(())
}
