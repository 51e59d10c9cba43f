// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Materializes recurring transactions into the ledger, once per calendar
//! month per definition.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use crate::store::{self, ScheduledFilter};
use crate::utils::month_key;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub executed_count: usize,
    pub executed_descriptions: Vec<String>,
    pub skipped_count: usize,
    pub failed_count: usize,
}

/// Fire every active definition due on `today` that has not run yet this
/// month. A failing definition is logged and does not stop the batch.
///
/// Only the initial candidate query can make this return an error.
pub fn process(conn: &Connection, today: NaiveDate) -> Result<ProcessReport> {
    let filter = ScheduledFilter {
        active: Some(true),
        day_of_month: Some(today.day()),
    };
    let candidates =
        store::find_scheduled(conn, &filter).context("Load scheduled transactions due today")?;
    let current_month = month_key(today);

    let mut report = ProcessReport::default();
    for def in candidates {
        let last_month = def.last_executed_date.map(month_key);
        if last_month.as_deref() == Some(current_month.as_str()) {
            tracing::info!(
                id = def.id,
                description = %def.description,
                "scheduled transaction already executed this month"
            );
            report.skipped_count += 1;
            continue;
        }

        match store::record_scheduled_execution(conn, &def, today) {
            Ok(Some(tx_id)) => {
                tracing::info!(
                    id = def.id,
                    tx_id,
                    description = %def.description,
                    "executed scheduled transaction"
                );
                report.executed_count += 1;
                report.executed_descriptions.push(def.description.clone());
            }
            Ok(None) => {
                // stamped by another invocation between our read and write
                tracing::info!(
                    id = def.id,
                    description = %def.description,
                    "scheduled transaction already executed this month"
                );
                report.skipped_count += 1;
            }
            Err(err) => {
                tracing::warn!(
                    id = def.id,
                    description = %def.description,
                    error = %format!("{:#}", err),
                    "scheduled transaction failed, will retry on next run"
                );
                report.failed_count += 1;
            }
        }
    }

    tracing::info!(
        executed = report.executed_count,
        skipped = report.skipped_count,
        failed = report.failed_count,
        month = %current_month,
        "processed scheduled transactions"
    );
    Ok(report)
}
