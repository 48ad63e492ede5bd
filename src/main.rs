use signup_flow::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_json_subscriber, get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // stdout carries the console protocol, so logs go to stderr.
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|value| value == "json")
        .unwrap_or(false);
    if json_logs {
        let subscriber = get_json_subscriber("signup-flow".into(), "info".into(), std::io::stderr);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber("signup-flow".into(), "info".into(), std::io::stderr);
        init_subscriber(subscriber);
    }

    let configuration = get_configuration().expect("Failed to read configuration.");
    let application = Application::build(&configuration)?;
    tracing::info!("Reading commands from stdin");
    application.run_until_stopped().await
}
