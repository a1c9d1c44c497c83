use clap::Parser;
use client::input::InputManager;
use client::network::Client;
use client::rendering::Renderer;
use log::{error, info};
use macroquad::window::{next_frame, Conf};
use shared::{HEIGHT, WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Name shown to other players (defaults to "Player <id>")
    #[arg(long)]
    name: Option<String>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Pong".to_owned(),
        window_width: WIDTH,
        window_height: HEIGHT,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // macroquad drives the frame loop; network exchanges block on this runtime
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    info!("Connecting to: {}", args.server);
    let mut client = match runtime.block_on(Client::connect(&args.server, args.name)) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Controls: arrow keys move your paddle along its edge");

    let input = InputManager::new();
    let mut renderer = Renderer::new();

    loop {
        if let Err(e) = runtime.block_on(client.tick()) {
            error!("Session ended: {}", e);
            std::process::exit(1);
        }

        input.update(client.game_mut().paddle_mut());
        renderer.render(client.game());

        next_frame().await;
    }
}
