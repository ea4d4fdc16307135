use nerv::{Model, Prng, Vector};

fn main() -> nerv::Result<()> {
    let mut model = Model::new(&[2, 3, 1]);
    let mut rng = Prng::seed(1);
    model.init(&mut rng);

    let samples: [([f32; 2], f32); 4] = [
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([0.0, 0.0], 0.0),
    ];

    let alpha = 0.5;
    let epochs = 10_000;

    for epoch in 0..epochs {
        let mut total_cost = 0.0;
        for (input, target) in &samples {
            let desired = Vector::from_values(&[*target]);
            model.set_input(input)?;
            model.forward()?;
            model.backward(&desired)?;
            model.update(alpha)?;
            total_cost += model.cost(&desired)?;
        }
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: cost = {total_cost:.6}");
        }
    }

    for (input, _) in &samples {
        model.set_input(input)?;
        model.forward()?;
        println!("Input: {:?} -> Output: {:.4}", input, model.output()[0]);
    }

    let path = std::env::temp_dir().join("xor.nerv");
    nerv::io::save(&model, &path)?;
    let reloaded = nerv::io::load(&path)?;
    println!("\nReloaded model from {}:", path.display());
    print!("{}", reloaded.structure());

    Ok(())
}
