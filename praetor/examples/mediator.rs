use async_trait::async_trait;
use praetor::context::AppContext;
use praetor::error::AppError;
use praetor::handler::{CommandHandler, EventHandler, RequestHandler};
use praetor::pipeline::{CommandShape, RequestShape};
use praetor::{Dispatcher, DispatcherConfig, LoggingBehavior, Mediator, Registry};
use praetor_macros::{command, event, request};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct UserDto {
    id: u64,
    name: String,
}

#[command(name = "user.create")]
#[derive(Debug)]
struct CreateUser {
    name: String,
}

#[request(response = Option<UserDto>, name = "user.get")]
#[derive(Debug)]
struct GetUser {
    id: u64,
}

#[event(name = "user.created")]
#[derive(Debug)]
struct UserCreated {
    id: u64,
    name: String,
}

#[derive(Default)]
struct UserStore {
    users: Mutex<HashMap<u64, String>>,
}

struct CreateUserHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: &CreateUser) -> Result<(), AppError> {
        let mut users = self
            .store
            .users
            .lock()
            .map_err(|_| AppError::Infra("user store poisoned".into()))?;
        let id = users.len() as u64 + 1;
        users.insert(id, cmd.name.clone());
        Ok(())
    }
}

struct GetUserHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl RequestHandler<GetUser> for GetUserHandler {
    async fn handle(&self, _ctx: &AppContext, q: &GetUser) -> Result<Option<UserDto>, AppError> {
        let users = self
            .store
            .users
            .lock()
            .map_err(|_| AppError::Infra("user store poisoned".into()))?;
        Ok(users.get(&q.id).map(|name| UserDto {
            id: q.id,
            name: name.clone(),
        }))
    }
}

struct SendWelcomeMail;

#[async_trait]
impl EventHandler<UserCreated> for SendWelcomeMail {
    fn handler_name(&self) -> &'static str {
        "send_welcome_mail"
    }

    async fn handle(&self, _ctx: &AppContext, ev: &UserCreated) -> Result<(), AppError> {
        println!("welcome mail -> user {} ({})", ev.id, ev.name);
        Ok(())
    }
}

struct UpdateSearchIndex;

#[async_trait]
impl EventHandler<UserCreated> for UpdateSearchIndex {
    async fn handle(&self, _ctx: &AppContext, ev: &UserCreated) -> Result<(), AppError> {
        println!("search index <- user {}", ev.id);
        Ok(())
    }
}

// 只依赖 Mediator 抽象的应用服务
async fn onboard<M: Mediator>(mediator: &M, ctx: &AppContext, name: &str) -> Result<Option<UserDto>, AppError> {
    mediator
        .execute(ctx, CreateUser { name: name.to_string() })
        .await?;
    let user = mediator.send(ctx, GetUser { id: 1 }).await?;
    if let Some(user) = &user {
        mediator
            .publish(
                ctx,
                UserCreated {
                    id: user.id,
                    name: user.name.clone(),
                },
            )
            .await?;
    }
    Ok(user)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let store = Arc::new(UserStore::default());
    let registry = Registry::new();
    registry.register_command_handler::<CreateUser, _>(Arc::new(CreateUserHandler {
        store: store.clone(),
    }))?;
    registry.register_request_handler::<GetUser, _>(Arc::new(GetUserHandler {
        store: store.clone(),
    }))?;
    registry.register_event_handler::<UserCreated, _>(Arc::new(SendWelcomeMail));
    registry.register_event_handler::<UserCreated, _>(Arc::new(UpdateSearchIndex));
    registry.register_global_behavior::<RequestShape, _>(Arc::new(LoggingBehavior));
    registry.register_global_behavior::<CommandShape, _>(Arc::new(LoggingBehavior));

    let dispatcher = Dispatcher::builder()
        .resolver(Arc::new(registry))
        .config(DispatcherConfig {
            publish_concurrency: Some(4),
        })
        .build();

    let ctx = AppContext::builder()
        .correlation_id("cor-1".into())
        .actor_id("admin".into())
        .build();

    let user = onboard(&dispatcher, &ctx, "Ada").await?;
    println!("onboarded: {user:?}");

    match dispatcher.send(&ctx, GetUser { id: 99 }).await? {
        Some(user) => println!("found: {user:?}"),
        None => println!("user 99 not found"),
    }

    Ok(())
}
