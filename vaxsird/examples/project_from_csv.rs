use vaxsird::io::series::load_series_csv;
use vaxsird::{ProjectionRequest, Projector, VaccinationRate};

// usage: project_from_csv <series.csv> <population> <vaccination %> <days> [cumulative deaths]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    anyhow::ensure!(
        args.len() >= 4,
        "usage: project_from_csv <series.csv> <population> <vaccination %> <days> [cumulative deaths]"
    );
    let series = load_series_csv(&args[0])?;
    println!("# series {} ({} days)", series.span(), series.cases.len());
    if series.adjusted > 0 {
        eprintln!("warning: {} cells were rounded or zeroed while reading", series.adjusted);
    }
    let population: u64 = args[1].parse()?;
    let vaccination_rate = VaccinationRate::from_percent(args[2].parse()?)?;
    let days: u32 = args[3].parse()?;

    // An explicit total wins; otherwise sum the file's daily deaths if it has them.
    let cumulative_deaths = match args.get(4) {
        Some(d) => d.parse()?,
        None => series.cumulative_deaths()?.unwrap_or(0),
    };

    let req = ProjectionRequest {
        cases: series.cases,
        population,
        cumulative_deaths,
        vaccination_rate,
        days,
        strict: false,
    };

    let projector = Projector::default();
    println!("day,S_unvacc,S_vacc,I_unvacc,I_vacc,R,D");
    for snap in projector.trajectory(&req)? {
        let s = snap.state;
        println!(
            "{},{:.0},{:.0},{:.0},{:.0},{:.0},{:.0}",
            snap.day, s.s_unvacc, s.s_vacc, s.i_unvacc, s.i_vacc, s.recovered, s.dead
        );
    }

    let projection = projector.project(&req)?;
    for d in &projection.diagnostics {
        eprintln!("warning: {}", d);
    }
    println!(
        "day {}: new_cases={} new_deaths={}",
        days, projection.result.new_cases, projection.result.new_deaths
    );
    Ok(())
}
