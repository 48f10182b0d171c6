use anyhow::Result;
use polars::prelude::*;
use rand::Rng;

use saas_ipo_trends::aggregate::RollingSpec;
use saas_ipo_trends::{process, render};

fn main() -> Result<()> {
    let mut rng = rand::thread_rng();
    let n = 200;

    let founded = (0..n).map(|_| rng.gen_range(1985..2018)).collect::<Vec<i32>>();
    let ipo = founded
        .iter()
        .map(|f| f + rng.gen_range(-2..20))
        .collect::<Vec<i32>>();

    let df = df!(
        "Company" => (0..n).map(|i| format!("company-{i}")).collect::<Vec<String>>(),
        "Year Founded" => founded,
        "IPO Year" => ipo,
    )?;

    let (df, summary) = process(df, &RollingSpec::default())?;
    println!("{:?}", df.head(Some(10)));

    let fig = render::build_figure(&summary);
    render::write_html(&fig, "synthetic_ipo_trends.html")?;
    println!("wrote synthetic_ipo_trends.html ({} traces)", fig.data.len());

    Ok(())
}
