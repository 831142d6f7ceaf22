use limeprompt::{OpenAIClient, PromptRunnerBuilder};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, JsonSchema)]
struct Email {
    subject: String,
    message: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
    let client = OpenAIClient::new(api_key);

    let runner = PromptRunnerBuilder::new()
        .client(&client)
        .model("gpt-4o-mini")
        .prompt("Write an email to <name> about <topic>")
        .vars([("name", "Bob"), ("topic", "lemons")])
        .max_tokens(1024)
        .build::<Email>()
        .expect("Invalid runner configuration");

    let result = runner.run().await.expect("Prompt execution failed");

    println!("Subject: {}", result.output.subject);
    println!("Message: {}", result.output.message);
    if let Some(reasoning) = result.reasoning {
        println!("\nChain of Thought:\n{}", reasoning);
    }
}
