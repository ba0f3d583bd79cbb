use anyhow::Context;

use crate::model::sird::DaySnapshot;

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.6}", x)).unwrap_or_default()
}

pub fn write_trajectory_debug_log(
    out_dir: impl AsRef<std::path::Path>,
    run_id: &str,
    population: u64,
    vaccination_rate: f64,
    days: u32,
    trajectory: &[DaySnapshot],
) -> anyhow::Result<std::path::PathBuf> {
    use std::io::Write;

    anyhow::ensure!(!trajectory.is_empty(), "empty trajectory");
    std::fs::create_dir_all(out_dir.as_ref()).context("create logs dir failed")?;
    let path = out_dir.as_ref().join(format!("sird_{}.txt", run_id));
    let mut f = std::fs::File::create(&path)
        .with_context(|| format!("create debug log file failed (path={:?})", path))?;

    writeln!(f, "run_id={}", run_id)?;
    writeln!(f, "population={}", population)?;
    writeln!(f, "vaccination_rate={:.6}", vaccination_rate)?;
    writeln!(f, "days={}", days)?;
    writeln!(f)?;
    writeln!(f, "day,s_unvacc,s_vacc,i_unvacc,i_vacc,recovered,dead,new_cases,new_deaths")?;

    for snap in trajectory {
        let s = &snap.state;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{},{}",
            snap.day,
            s.s_unvacc,
            s.s_vacc,
            s.i_unvacc,
            s.i_vacc,
            s.recovered,
            s.dead,
            opt(snap.flows.map(|fl| fl.new_cases())),
            opt(snap.flows.map(|fl| fl.new_deaths)),
        )?;
    }

    Ok(path)
}
