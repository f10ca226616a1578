// Usage: gate-efficiency [AIRLINE] [FLIGHT]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let airline = args.next();
    let flight = args.next();
    gate_efficiency::run(airline, flight).await
}
