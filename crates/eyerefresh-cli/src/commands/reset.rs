use super::{open_db, CliResult};

pub fn run() -> CliResult {
    let db = open_db()?;
    db.reset_data()?;
    println!("all reminder data cleared");
    Ok(())
}
