#[tokio::main]
async fn main() {
    coaching_backend::run().await;
}
