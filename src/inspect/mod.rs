pub mod autostart;
pub mod crontab;
pub mod disk;
pub mod instance;
pub mod logs;
pub mod process;
pub mod status;
pub mod variables;

use std::sync::LazyLock;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rusqlite::Connection;

use crate::db;
use crate::report::ReportContext;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

/// Verdict rendered when an aggregate the summary depends on has no rows.
pub const INSUFFICIENT_DATA: &str = "数据不足，无法计算";

/// Run the whole battery for one system and assemble the renderer handoff.
/// Each rule owns its keys and tables; none of them aborts the battery.
pub fn inspect_system(conn: &Connection, system: &str) -> Result<ReportContext> {
    let mut ctx = ReportContext::default();
    header(conn, system, &mut ctx)?;
    status::check(conn, system, &mut ctx)?;
    disk::check(conn, system, &mut ctx)?;
    process::check(conn, system, &mut ctx)?;
    logs::check(conn, system, &mut ctx)?;
    instance::check(conn, system, &mut ctx)?;
    autostart::check(conn, system, &mut ctx)?;
    variables::check(conn, system, &mut ctx)?;
    crontab::check(conn, system, &mut ctx)?;
    Ok(ctx)
}

/// Report header: system name, management-node IP, and the inspection month
/// recovered from the dump file's name.
fn header(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let ma_one = db::fetch_sys_row(conn, system)?
        .and_then(|s| s.ma_one_ip)
        .unwrap_or_default();

    let date = db::filename_for_system(conn, system)?
        .and_then(|f| DATE_RE.find(&f).map(|m| m.as_str().to_string()))
        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
        .map(|d| format!("{}年{}月", d.year(), d.month()))
        .unwrap_or_default();

    ctx.set("SYS_NAME", system);
    ctx.set("MA_ONE_IP", ma_one);
    ctx.set("DATE_TEAR", date);
    Ok(())
}

/// Fixed four-decimal rendering used by every percentage and TB figure.
pub(crate) fn round4(x: f64) -> String {
    format!("{x:.4}")
}

// ── Tests ──
