use limeprompt::{RunnerConfig, Variables};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, JsonSchema)]
struct Email {
    subject: String,
    message: String,
}

const CONFIG: &str = r#"
model = "claude-3-5-sonnet-20240620"
prompt = "Write an email to <name> about <topic>"
max_tokens = 1024
log_level = "info"

[vars]
name = "Alice"
topic = "oranges"

[client]
backend = "anthropic"
"#;

#[tokio::main]
async fn main() -> Result<(), limeprompt::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RunnerConfig::from_toml_str(CONFIG)?;
    let client = config.client.build()?;

    let mut vars: Variables = config.variables();
    if let Some(name) = std::env::args().nth(1) {
        vars.insert("name", name);
    }

    let runner = config
        .runner(&*client)?
        .vars(vars.iter())
        .build::<Email>()?;

    let result = runner.run_with_max_tokens(512).await?;

    println!("Subject: {}", result.output.subject);
    println!("Message: {}", result.output.message);
    println!(
        "\nChain of Thought:\n{}",
        result.reasoning.unwrap_or_default()
    );
    Ok(())
}
