use async_trait::async_trait;
use praetor::context::AppContext;
use praetor::error::AppError;
use praetor::handler::CommandHandler;
use praetor::pipeline::CommandShape;
use praetor::{Dispatcher, LoggingBehavior, Registry};
use praetor_macros::command;
use praetor_validation::{Rules, ValidationRegistryExt, Validator};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[command(name = "user.create")]
#[derive(Debug)]
struct CreateUser {
    user_name: String,
    email: String,
}

struct CreateUserHandler;

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: &CreateUser) -> Result<(), AppError> {
        println!("CreateUser: user_name={}, email={}", cmd.user_name, cmd.email);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let registry = Registry::new();
    registry.register_command_handler::<CreateUser, _>(Arc::new(CreateUserHandler))?;
    registry.register_global_behavior::<CommandShape, _>(Arc::new(LoggingBehavior));
    registry.add_command_validation::<CreateUser>(vec![Arc::new(
        Rules::<CreateUser>::new()
            .not_empty("user_name", |c| c.user_name.as_str())
            .min_length("user_name", 3, |c| c.user_name.as_str())
            .must("email", |c| c.email.contains('@'), "is not a valid email address"),
    ) as Arc<dyn Validator<CreateUser>>]);

    let dispatcher = Dispatcher::new(Arc::new(registry));
    let ctx = AppContext::builder().correlation_id("cor-1".into()).build();

    dispatcher
        .execute(
            &ctx,
            CreateUser {
                user_name: "John Doe".into(),
                email: "john.doe@example.com".into(),
            },
        )
        .await?;

    match dispatcher
        .execute(
            &ctx,
            CreateUser {
                user_name: "".into(),
                email: "not-an-email".into(),
            },
        )
        .await
    {
        Err(AppError::Validation(errors)) => println!("rejected: {errors}"),
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
