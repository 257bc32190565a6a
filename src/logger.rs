/// Initializes the logging system.
///
/// Sets up the logger from a `log4rs.yaml` configuration file. Call once at
/// the start of the embedding application; queries log their routing
/// decisions at debug level.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file("log4rs.yaml", Default::default())?;
    Ok(())
}
