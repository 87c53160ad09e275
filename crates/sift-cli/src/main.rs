use std::error::Error;
use std::sync::Arc;

use serde::Serialize;
use sift_core::app::{Command, EngineConfig, Revision, Submission};
use sift_core::domain::{Identity, Profile, Verdict};
use sift_core::impls::{InMemoryRecordStore, StaticIdentityProvider};
use sift_core::ports::{IdentityProvider, RequestContext};
use sift_core::{EngineBuilder, WorkflowEngine, WorkflowError};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn print_view<T: Serialize>(label: &str, view: &T) -> CliResult<()> {
    println!("--- {label}");
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

/// 失敗が期待される操作：エラー種別を表示して続行
fn expect_refusal<T>(label: &str, result: Result<T, WorkflowError>) -> CliResult<()> {
    match result {
        Ok(_) => Err(format!("{label}: expected a refusal").into()),
        Err(err) => {
            println!("--- {label}: refused ({:?}) {err}", err.kind());
            Ok(())
        }
    }
}

/// session token → identity（ログイン層の代わり）
async fn sign_in(
    provider: &StaticIdentityProvider,
    token: &str,
    identity: Identity,
) -> CliResult<Identity> {
    provider.sign_in(token, identity);
    provider
        .resolve(&RequestContext::with_session(token))
        .await
        .ok_or_else(|| format!("session {token} did not resolve").into())
}

fn load_config() -> CliResult<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            tracing::info!(%path, "loading engine config");
            Ok(EngineConfig::from_json(&json)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

async fn run(engine: &WorkflowEngine, sessions: &StaticIdentityProvider) -> CliResult<()> {
    // (A) アカウントと食材を用意
    let u1 = engine
        .register_submitter(Profile::new("Una", "Baker", "una@example.com")?)
        .await?;
    let v1 = engine
        .register_reviewer(Profile::new("Vik", "Taster", "vik@example.com")?)
        .await?;
    let submitter = sign_in(sessions, "session-u1", Identity::Submitter(u1.id())).await?;
    let reviewer = sign_in(sessions, "session-v1", Identity::Reviewer(v1.id())).await?;

    let flour = engine.add_ingredient(&reviewer, "flour").await?;
    let oat_milk = engine.add_ingredient(&reviewer, "oat milk").await?;

    // (B) Scenario A: submit → assign → approve
    let r1 = engine
        .execute(
            &submitter,
            Command::Submit(Submission {
                price: "10".to_string(),
                vegan: false,
                ingredients: vec![flour.id()],
            }),
        )
        .await?;
    print_view("submitted", &r1)?;

    let board = engine.reviewer_dashboard(v1.id()).await?;
    let next = board.next_up().map(|r| r.id()).ok_or("queue is empty")?;
    engine
        .execute(&reviewer, Command::Assign { recipe: next })
        .await?;
    let r1 = engine
        .execute(
            &reviewer,
            Command::Decide {
                recipe: r1.id(),
                verdict: Verdict::Approved,
            },
        )
        .await?;
    print_view("approved", &r1)?;

    // (C) Scenario D: 2 件目は担当中のため割り当て不可
    let r2 = engine
        .execute(
            &submitter,
            Command::Submit(Submission {
                price: "12.5".to_string(),
                vegan: false,
                ingredients: vec![flour.id()],
            }),
        )
        .await?;
    let r3 = engine
        .execute(
            &submitter,
            Command::Submit(Submission {
                price: "8".to_string(),
                vegan: true,
                ingredients: vec![oat_milk.id()],
            }),
        )
        .await?;
    engine
        .execute(&reviewer, Command::Assign { recipe: r2.id() })
        .await?;
    expect_refusal(
        "assign while busy",
        engine
            .execute(&reviewer, Command::Assign { recipe: r3.id() })
            .await,
    )?;

    // (D) Scenario B: reject → submit は拒否
    engine
        .execute(
            &reviewer,
            Command::Decide {
                recipe: r2.id(),
                verdict: Verdict::Rejected,
            },
        )
        .await?;
    print_view(
        "submitter after rejection",
        &engine.submitter_dashboard(u1.id()).await?,
    )?;
    expect_refusal(
        "submit with a rejected recipe",
        engine
            .execute(
                &submitter,
                Command::Submit(Submission {
                    price: "3".to_string(),
                    vegan: false,
                    ingredients: vec![],
                }),
            )
            .await,
    )?;
    expect_refusal(
        "repeated decision",
        engine
            .execute(
                &reviewer,
                Command::Decide {
                    recipe: r2.id(),
                    verdict: Verdict::Rejected,
                },
            )
            .await,
    )?;

    // (E) Scenario C: resubmit → submit が再び可能
    let r2 = engine
        .execute(
            &submitter,
            Command::Resubmit {
                recipe: r2.id(),
                revision: Revision {
                    vegan: true,
                    ingredients: vec![oat_milk.id()],
                },
            },
        )
        .await?;
    print_view("resubmitted", &r2)?;
    engine
        .execute(
            &submitter,
            Command::Submit(Submission {
                price: "3".to_string(),
                vegan: false,
                ingredients: vec![],
            }),
        )
        .await?;

    sessions.sign_out("session-u1");
    sessions.sign_out("session-v1");

    print_view("review counts", &engine.review_counts().await?)?;
    print_view("reviewer", &engine.reviewer_dashboard(v1.id()).await?)?;
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(InMemoryRecordStore::new());
    let engine = EngineBuilder::new()
        .store(store)
        .config(load_config()?)
        .with_env()?
        .build()?;
    let sessions = StaticIdentityProvider::new();

    run(&engine, &sessions).await?;
    tracing::info!("all scenarios completed");
    Ok(())
}
