use std::time::Instant;

use crate::commands::CommandResult;
use pizzeria_core::config::{AppConfig, LoadOptions};
use pizzeria_core::domain::order::{Order, OrderItem, OrderRequest, OrderStatus};
use pizzeria_core::errors::{ApplicationError, DomainError};
use pizzeria_db::{open_service, PizzeriaService};
use serde::Serialize;

const SMOKE_USER: &str = "smoke-test";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

/// Opens the configured store, places a one-pizza order and cancels it again.
pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(LoadOptions::default())) {
        Ok((elapsed_ms, config)) => {
            checks.push(pass_check(
                "config_validation",
                elapsed_ms,
                "configuration loaded and validated",
            ));
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(fail_check("config_validation", elapsed_ms, error.to_string()));
            skip_remaining(&mut checks, &["store_open", "place_order", "cancel_order"]);
            return finalize_report(checks, elapsed_since(started));
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(fail_check(
                "store_open",
                0,
                format!("failed to initialize async runtime: {error}"),
            ));
            skip_remaining(&mut checks, &["place_order", "cancel_order"]);
            return finalize_report(checks, elapsed_since(started));
        }
    };

    let opened = match timed_check(|| runtime.block_on(open_service(&config))) {
        Ok((elapsed_ms, opened)) => {
            checks.push(pass_check(
                "store_open",
                elapsed_ms,
                format!("opened `{}` store", config.store.backend.as_str()),
            ));
            opened
        }
        Err((elapsed_ms, error)) => {
            checks.push(fail_check("store_open", elapsed_ms, error.to_string()));
            skip_remaining(&mut checks, &["place_order", "cancel_order"]);
            return finalize_report(checks, elapsed_since(started));
        }
    };

    match timed_check(|| runtime.block_on(place_demo_order(&opened.service))) {
        Ok((elapsed_ms, order)) => {
            checks.push(pass_check(
                "place_order",
                elapsed_ms,
                format!("placed order {} totalling {}", order.id.0, order.total_price),
            ));
            match timed_check(|| runtime.block_on(cancel_demo_order(&opened.service, &order))) {
                Ok((elapsed_ms, cancelled)) => checks.push(pass_check(
                    "cancel_order",
                    elapsed_ms,
                    format!("order {} is {}", cancelled.id.0, cancelled.status),
                )),
                Err((elapsed_ms, error)) => {
                    checks.push(fail_check("cancel_order", elapsed_ms, error.to_string()))
                }
            }
        }
        Err((elapsed_ms, error)) => {
            checks.push(fail_check("place_order", elapsed_ms, error.to_string()));
            skip_remaining(&mut checks, &["cancel_order"]);
        }
    }

    if let Some(pool) = opened.pool {
        runtime.block_on(async {
            pool.close().await;
        });
    }

    finalize_report(checks, elapsed_since(started))
}

async fn place_demo_order(service: &PizzeriaService) -> Result<Order, ApplicationError> {
    let pizzas = service.list_pizzas().await?;
    let pizza = pizzas
        .first()
        .ok_or_else(|| DomainError::invalid("the catalog has no pizzas; run `pizzeria seed`"))?;

    service
        .place_order(OrderRequest {
            user_id: SMOKE_USER.to_string(),
            items: vec![OrderItem { pizza_id: pizza.id, quantity: 1 }],
        })
        .await
}

async fn cancel_demo_order(
    service: &PizzeriaService,
    order: &Order,
) -> Result<Order, ApplicationError> {
    let cancelled = service.cancel_order(order.id, SMOKE_USER).await?;
    let stored = service.get_order(order.id).await?;
    if stored.status != OrderStatus::Cancelled {
        return Err(ApplicationError::Persistence(format!(
            "order {} reads back as {}",
            order.id.0, stored.status
        )));
    }
    Ok(cancelled)
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((elapsed_since(started), value)),
        Err(error) => Err((elapsed_since(started), error)),
    }
}

fn elapsed_since(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn pass_check(name: &'static str, elapsed_ms: u64, message: impl Into<String>) -> SmokeCheck {
    SmokeCheck { name, status: SmokeStatus::Pass, elapsed_ms, message: message.into() }
}

fn fail_check(name: &'static str, elapsed_ms: u64, message: impl Into<String>) -> SmokeCheck {
    SmokeCheck { name, status: SmokeStatus::Fail, elapsed_ms, message: message.into() }
}

fn skip_remaining(checks: &mut Vec<SmokeCheck>, names: &[&'static str]) {
    checks.extend(names.iter().map(|&name| SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }));
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
