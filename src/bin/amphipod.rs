use std::io::Read;

use anyhow::{anyhow, Context, Result};

use burrow::{Configuration, Settings, Solver, UNFOLDED_ROWS};

fn main() -> Result<()> {
    env_logger::init();

    let mut settings = Settings::default();
    let mut unfold = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--unfold" => unfold = true,
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a path"))?;
                settings = Settings::load(path)?;
            }
            _ => return Err(anyhow!("Unknown argument `{arg}`")),
        }
    }

    if unfold && settings.extra_rows.is_empty() {
        settings.extra_rows = UNFOLDED_ROWS.iter().map(|row| row.to_string()).collect();
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read diagram from stdin")?;

    let mut initial: Configuration = input.parse()?;
    if !settings.extra_rows.is_empty() {
        initial = initial.unfold(settings.extra_rows.as_slice())?;
    }
    log::info!("Initial state:\n{initial}");

    let mut solver = Solver::new((), initial);
    solver.set_config(settings.solver);

    let solution = match solver.solve() {
        Ok(solution) => solution,
        Err(err) => {
            log::error!("{err} ({} seconds)", solver.time_spent());
            return Err(err.into());
        }
    };

    log::info!(
        "Solved after {} states in {} seconds:\n{}",
        solution.states_checked,
        solver.time_spent(),
        solver.stringify(&solution.state),
    );
    for step in solution.steps.iter() {
        log::debug!("{step}");
    }

    println!("{}", solution.cost);
    Ok(())
}
