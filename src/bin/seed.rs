use std::sync::Arc;

use clap::Parser;
use fake::{
    faker::{
        address::en::StateName,
        company::en::{CompanyName, Industry},
        name::en::{FirstName, LastName},
    },
    Fake,
};
use rand::Rng;

use memberhub::{
    config::{DatabaseConfig, Settings},
    domain::{CreatePaymentRequest, MemberStatus, PaymentStatus, RegisterRequest},
    repository::{defaults, RecordStore},
    service::{ServiceContext, SystemClock},
};

const CATEGORIES: [&str; 4] = ["Corporate", "Associate", "Professional", "Patron"];

/// Fills a database with the factory defaults plus generated members.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// Database URL; defaults to the configured one
    #[arg(long)]
    database_url: Option<String>,

    /// How many extra members to register
    #[arg(long, default_value_t = 12)]
    members: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let mut settings = Settings::new().unwrap_or_default();
    if let Some(url) = args.database_url {
        settings.database = DatabaseConfig { url, ..settings.database };
    }

    let store = RecordStore::open(&settings.database).await?;
    let context = Arc::new(ServiceContext::new(store, &settings, Arc::new(SystemClock)));

    println!("📋 Loading factory defaults...");
    context.load_or_seed().await?;

    println!("👥 Registering {} members...", args.members);
    let mut rng = rand::thread_rng();
    let mut approved = 0;

    for i in 0..args.members {
        let first_name: String = FirstName().fake();
        let last_name: String = LastName().fake();
        let business_name: String = CompanyName().fake();

        let request = RegisterRequest {
            email: format!(
                "{}.{}{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                i
            ),
            password: defaults::DEFAULT_MEMBER_PASSWORD.to_string(),
            first_name,
            last_name,
            phone: format!("080{:08}", rng.gen_range(0..100_000_000u32)),
            business_address: format!("{} Industrial Estate", rng.gen_range(1..200)),
            business_category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            state: StateName().fake(),
            materials: Industry().fake(),
            machinery: "Baler".to_string(),
            monthly_volume: Some(rng.gen_range(5..500) as f64),
            employees: Some(rng.gen_range(1..200) as f64),
            profile_image: None,
            documents: None,
            business_name,
        };

        let user = match context.member_service.register(request).await {
            Ok(user) => user,
            Err(e) => {
                println!("  ⚠️  Skipped a generated member: {}", e);
                continue;
            }
        };

        // Approve roughly two thirds and record their dues
        if i % 3 != 2 {
            context.member_service.update_status(&user.id, MemberStatus::Active).await?;
            context.payment_service.create(CreatePaymentRequest {
                user_id: user.id.clone(),
                amount: 150_000,
                description: "Annual membership dues".to_string(),
                currency: None,
                date: None,
                status: Some(PaymentStatus::Successful),
                receipt: None,
            }).await?;
            approved += 1;
        }
    }

    println!("  ✅ Registered members, {} approved with dues paid", approved);

    println!("\n✨ Database seeding complete!");
    println!("\n📝 Test credentials:");
    println!("  Admin: {} / {}", defaults::DEFAULT_ADMIN_EMAIL, defaults::DEFAULT_ADMIN_PASSWORD);
    println!("  Password for all members: {}", defaults::DEFAULT_MEMBER_PASSWORD);

    Ok(())
}
