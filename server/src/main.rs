use clap::Parser;
use server::network::GameServer;

/// Two-player tic-tac-toe server over a line-delimited TCP protocol.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the listener to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Board side length
    #[arg(short, long, default_value_t = shared::DEFAULT_BOARD_SIZE)]
    board_size: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    if args.board_size < 2 {
        return Err("board size must be at least 2".into());
    }

    let address = format!("{}:{}", args.host, args.port);
    let server = GameServer::new(&address, args.board_size).await?;
    server.run().await?;

    Ok(())
}
