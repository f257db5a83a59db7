#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    certificate_issuance_server::run().await
}
