//! Runtime integration tests: configuration in, telemetry out.

use serde_json::{json, Value};
use tessera::prelude::*;
use tessera::telemetry::{init_metrics, render_metrics};

fn runtime_from_toml(toml: &str) -> Runtime {
    let config = ConfigLoader::new()
        .with_string(toml, "toml")
        .unwrap()
        .load()
        .unwrap();
    Runtime::from_config(&config)
}

#[tokio::test]
async fn test_runtime_from_configuration() {
    let runtime = runtime_from_toml(
        r#"
            [runtime]
            name = "inventory"
            dev = true
        "#,
    );
    assert!(runtime.is_dev());

    let reserve = runtime
        .procedure_named("reserve")
        .input(schema::<u32>())
        .resolve(|opts: ResolveOptions| async move {
            let qty: u32 = opts.input_as()?;
            if qty > 10 {
                return Err(Thrown::from(ProcedureError::new(
                    ErrorCode::Conflict,
                    "not enough stock",
                )));
            }
            Ok::<_, Thrown>(json!({ "reserved": qty }))
        });

    let reply = runtime
        .call(&reserve, CallOptions::new(Value::Null, 3))
        .await
        .unwrap();
    assert_eq!(reply, json!({ "ok": true, "data": { "reserved": 3 } }));

    let reply = runtime
        .call(&reserve, CallOptions::new(Value::Null, 11))
        .await
        .unwrap();
    assert_eq!(reply["error"]["message"], json!("not enough stock"));
    assert_eq!(reply["error"]["data"]["httpStatus"], json!(409));
    assert_eq!(reply["error"]["data"]["path"], json!("inventory.reserve"));
}

#[tokio::test]
async fn test_shared_definition_across_procedures() {
    let runtime = Runtime::new(RuntimeConfig::named("admin"));

    let guarded = runtime
        .procedure()
        .use_fn("require_admin", |opts: MiddlewareOptions| async move {
            if opts.ctx.get("admin") == Some(&json!(true)) {
                StepResult::Ok(opts.next.run().await?)
            } else {
                StepResult::Ok(Outcome::failure(ProcedureError::new(
                    ErrorCode::Forbidden,
                    "admins only",
                )))
            }
        })
        .definition()
        .clone();

    let purge = runtime
        .procedure_from(guarded.clone())
        .unwrap()
        .name("admin.purge")
        .resolve(|_opts: ResolveOptions| async move { Ok::<_, Thrown>("purged") });
    let stats = runtime
        .procedure_from(guarded)
        .unwrap()
        .name("admin.stats")
        .resolve(|_opts: ResolveOptions| async move { Ok::<_, Thrown>(json!({ "users": 2 })) });

    let admin = CallOptions::new(json!({ "admin": true }), Value::Null);
    let guest = CallOptions::new(json!({}), Value::Null);

    assert_eq!(purge.call(admin).await.unwrap(), Outcome::success("purged"));
    assert_eq!(
        stats.call(guest).await.unwrap().error().map(ProcedureError::code),
        Some(ErrorCode::Forbidden)
    );
    assert_eq!(purge.name(), "admin.purge");
    assert_eq!(stats.name(), "admin.stats");
}

#[tokio::test]
async fn test_metrics_record_calls_and_step_failures() {
    init_metrics(&TesseraConfig::default().to_metrics_config()).unwrap();

    let runtime = Runtime::new(RuntimeConfig::named("metered"));
    let square = runtime
        .procedure_named("square")
        .input(schema::<i64>())
        .resolve(|opts: ResolveOptions| async move {
            let n: i64 = opts.input_as()?;
            Ok::<_, Thrown>(n * n)
        });

    square.call(CallOptions::new(Value::Null, 4)).await.unwrap();
    square.call(CallOptions::new(Value::Null, "four")).await.unwrap();

    let rendered = render_metrics().unwrap();
    assert!(rendered.contains("tessera_procedure_calls_total"));
    assert!(rendered.contains(r#"procedure="metered.square""#));
    assert!(rendered.contains("tessera_step_failures_total"));
    assert!(rendered.contains(r#"code="BAD_REQUEST""#));
    assert!(rendered.contains("tessera_procedure_duration_seconds"));
}

#[tokio::test]
async fn test_extension_through_facade() {
    let runtime = Runtime::default();
    let score = runtime
        .procedure_named("score")
        .resolve(|opts: ResolveOptions| async move {
            let bonus = opts.ctx.get("bonus").and_then(Value::as_i64).unwrap_or_default();
            let base: i64 = opts.input_as()?;
            Ok::<_, Thrown>(base + bonus)
        });

    let compare = score.extend(|opts| async move {
        let plain = opts.next.run().await?;
        let boosted = opts.next.with_ctx(json!({ "bonus": 5 })).await?;
        Ok::<_, CallError>(json!({ "plain": plain, "boosted": boosted }))
    });

    let data = compare
        .call(CallOptions::new(json!({}), 10))
        .await
        .unwrap();
    assert_eq!(data, json!({ "plain": 10, "boosted": 15 }));
}
