//! Mints a signed bearer token for local testing.
//!
//! There is no login endpoint; identity comes from the university SSO
//! in front of this service. This tool stands in for it during
//! development:
//!
//! ```text
//! cargo run --bin mint_token -- --user-id <uuid> --role student
//! ```

use clap::Parser;
use uuid::Uuid;

use registrar_service::config::APP_CONFIG;
use registrar_service::entities::sea_orm_active_enums::RoleEnum;
use registrar_service::extractor::{TokenClaims, encode_token};

#[derive(Parser, Debug)]
#[command(about = "Mint a bearer token for a user")]
struct Args {
    /// User ID the token will authenticate as.
    #[arg(long)]
    user_id: Uuid,

    /// One of: student, faculty, admin.
    #[arg(long)]
    role: String,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let role = match args.role.to_lowercase().as_str() {
        "student" => RoleEnum::Student,
        "faculty" => RoleEnum::Faculty,
        "admin" => RoleEnum::Admin,
        other => anyhow::bail!("Unknown role '{}', expected student, faculty or admin", other),
    };

    let claims = TokenClaims::new(args.user_id, role);
    let token = encode_token(&claims, &APP_CONFIG.jwt_secret)?;

    println!("{}", token);
    Ok(())
}
