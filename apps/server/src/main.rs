use anyhow::Context;
use clap::{Parser, Subcommand};
use euclid_api::{build_router, AppState};
use euclid_config::load as load_config;
use euclid_database::{NewCourse, NewCourseItem, NewItemContent, NewRole};
use euclid_runtime::{demo, telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

const DEMO_COURSE: &str = "Demo Course";

#[derive(Parser)]
#[command(name = "euclid-backend")]
#[command(about = "Euclid course backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Seed the demo user and a demo course
    SeedData,
    /// Print users, courses, memberships and course items
    DumpData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::SeedData => seed_data().await,
        Commands::DumpData => dump_data().await,
    }
}

async fn initialise() -> anyhow::Result<(euclid_config::AppConfig, BackendServices)> {
    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    Ok((config, services))
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Euclid backend");

    let (config, services) = initialise().await?;

    let state = AppState::new(
        services.db_pool.clone(),
        services.authenticator.clone(),
        &config.auth,
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(euclid_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let (_, services) = initialise().await?;
    let repos = &services.repositories;

    services.seed_demo_user().await?;
    let bob = repos
        .users
        .find_by_username(demo::USERNAME)
        .await?
        .context("demo username is held by no account")?;

    let existing = repos.courses.list_for_user(&bob.id).await?;
    if existing.iter().any(|course| course.name == DEMO_COURSE) {
        println!("Demo course already present; nothing to do");
        return Ok(());
    }

    let (course, _) = repos
        .courses
        .create(
            &NewCourse {
                creator_id: bob.id,
                name: DEMO_COURSE.to_string(),
                description: "A course to explore the API with".to_string(),
            },
            &bob.display_name,
        )
        .await
        .context("failed to create demo course")?;

    repos
        .roles
        .create(&NewRole {
            course_id: course.id,
            name: "Teaching Assistant".to_string(),
            color: Some("#4ecdc4".to_string()),
            priority: 10,
        })
        .await
        .context("failed to create demo role")?;

    let welcome = repos
        .items
        .create(&NewCourseItem {
            course_id: course.id,
            creator_id: bob.id,
            name: "Welcome".to_string(),
            visible_role: None,
            parent_id: None,
            content: NewItemContent::Page,
        })
        .await
        .context("failed to create demo page")?;

    repos
        .items
        .create(&NewCourseItem {
            course_id: course.id,
            creator_id: bob.id,
            name: "First Assignment".to_string(),
            visible_role: None,
            parent_id: Some(welcome.id),
            content: NewItemContent::Assignment {
                number_of_problems: 3,
            },
        })
        .await
        .context("failed to create demo assignment")?;

    println!("Database seeded with demo data:");
    println!("- user {} ({})", bob.username, bob.id);
    println!("- course {} ({})", course.name, course.id);
    println!("- 1 role, 1 page, 1 assignment");
    println!("Run 'dump-data' to see the inserted data");

    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    info!("dumping database contents");

    let (_, services) = initialise().await?;
    let repos = &services.repositories;

    println!("=== USERS ===");
    let users = repos.users.list().await.context("failed to fetch users")?;
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!(
            "{:<26} {:<20} {:<30} {:<12} {:<15}",
            "ID", "Username", "Email", "Birthday", "Authorities"
        );
        println!("{}", "-".repeat(106));
        for user in users {
            let authorities: Vec<_> = user.authorities.iter().map(String::as_str).collect();
            println!(
                "{:<26} {:<20} {:<30} {:<12} {:<15}",
                user.id.to_string(),
                user.username,
                user.email,
                user.birthday.to_string(),
                authorities.join(",")
            );
        }
    }

    let courses = repos.courses.list().await.context("failed to fetch courses")?;

    println!("\n=== COURSES ===");
    if courses.is_empty() {
        println!("No courses found in database");
    }
    for course in &courses {
        println!("{} {} (creator {})", course.id, course.name, course.creator_id);

        for member in repos.members.list_by_course(&course.id).await? {
            let roles = repos.roles.list_for_member(&member.id).await?;
            let role_names: Vec<_> = roles.iter().map(|role| role.name.as_str()).collect();
            println!(
                "  member {} user {} nickname {:?} roles [{}]",
                member.id,
                member.user_id,
                member.nickname,
                role_names.join(", ")
            );
        }

        for item in repos.items.list_by_course(&course.id).await? {
            println!(
                "  {:<10} {} {:?} parent {} visible_role {}",
                item.kind().as_str(),
                item.id,
                item.name,
                item.parent_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "NULL".to_string()),
                item.visible_role
            );
        }
    }

    Ok(())
}
