/// flowcanvas: headless editor session
///
/// Opens a workflow from the local store (or creates one), prints its outline
/// and closes the session, which writes the final snapshot back.
///
/// Usage:
/// - `flowcanvas`            create a new workflow
/// - `flowcanvas <id>`       open an existing workflow
/// - `flowcanvas --list`     list stored workflows
/// - `flowcanvas --price [feed-id]`   latest Pyth price (ETH/USD by default)
/// - `flowcanvas --verify <token>`    check a Telegram bot token

use flowcanvas::{
    config::Config,
    services::{pyth::ETH_USD_FEED_ID, CredentialVerifier, HermesClient, PriceOracle, TelegramClient},
    workflow::storage::WorkflowStorage,
    EditorSession, OpenOutcome, Workflow,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    let config = Config::default();
    let mut args = std::env::args().skip(1);
    let arg = args.next();

    match arg.as_deref() {
        Some("--price") => {
            let feed_id = args.next().unwrap_or_else(|| ETH_USD_FEED_ID.to_string());
            let oracle = HermesClient::from_config(&config.services)?;
            let quote = oracle.latest_price(&feed_id).await?;
            println!(
                "{}  {:.4} ± {:.4}  (published {})",
                quote.feed_id, quote.price, quote.confidence, quote.publish_time
            );
            return Ok(());
        }
        Some("--verify") => {
            let token = args.next().ok_or("usage: flowcanvas --verify <token>")?;
            let verifier = TelegramClient::from_config(&config.services)?;
            let bot = verifier.verify(&token).await?;
            println!(
                "✅ {} (@{})",
                bot.display_name,
                bot.username.as_deref().unwrap_or("-")
            );
            return Ok(());
        }
        _ => {}
    }

    let storage = WorkflowStorage::open(&config.storage.data_dir).await?;
    if arg.as_deref() == Some("--list") {
        for meta in storage.list_workflows().await? {
            println!("{}  {}  (updated {})", meta.id, meta.title, meta.updated_at);
        }
        return Ok(());
    }

    let (session, outcome) =
        EditorSession::open(&storage, arg.as_deref(), config.editor.clone()).await?;
    if let OpenOutcome::Created { .. } = outcome {
        tracing::info!("Workflow available at {}", session.route());
    }

    print_outline(session.workflow());
    session.close().await?;

    Ok(())
}

fn print_outline(workflow: &Workflow) {
    println!("{} ({})", workflow.title, workflow.id);
    println!(
        "view: x={:.1} y={:.1} zoom={}%",
        workflow.transform.x,
        workflow.transform.y,
        workflow.transform.zoom_percent()
    );

    let order = match workflow.connection_graph().execution_order() {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!("{}", e);
            workflow.nodes.iter().map(|n| n.id.clone()).collect()
        }
    };

    for id in order {
        let Some(node) = workflow.node(&id) else {
            continue;
        };
        let mut depth = 0;
        let mut current = workflow.parent_of(&node.id);
        while let Some(parent) = current {
            depth += 1;
            if depth > workflow.nodes.len() {
                break;
            }
            current = workflow.parent_of(&parent.id);
        }
        println!(
            "{}- {} [{}] at ({:.0}, {:.0})",
            "  ".repeat(depth),
            node.name,
            node.kind(),
            node.position.x,
            node.position.y
        );
    }
}
