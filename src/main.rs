use anyhow::Result;
use clap::Parser;

use args::Args;
use context::{Config as ContextConfig, Context};
use env::Environment;
use utils::{
    banner::print_banner,
    telemetry::{get_subscriber, init_subscriber},
};

mod api;
mod args;
mod clients;
mod context;
mod env;
mod rewards;
mod slots;
mod sync_duties;
mod utils;

async fn run() -> Result<()> {
    dotenv::dotenv().ok();
    let env = Environment::from_env()?;
    let args = Args::parse();

    let _guard = env.sentry_dsn.clone().map(|sentry_dsn| {
        sentry::init((
            sentry_dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let subscriber = get_subscriber("info", std::io::stdout);
    init_subscriber(subscriber);

    let context_config = ContextConfig::from((&env, &args));
    let server_config = api::Config {
        address: args
            .server_address
            .clone()
            .unwrap_or_else(|| env.server_address.clone()),
        trusted_proxies: env.trusted_proxies()?,
    };

    print_banner(
        &args,
        &context_config,
        &server_config.address,
        server_config.trusted_proxies.len(),
    );

    let context = Context::try_new(context_config)?;

    api::serve(context, server_config).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
