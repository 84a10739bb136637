use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use rusqlite::Connection;
use tracing::warn;

use super::{round4, INSUFFICIENT_DATA};
use crate::db;
use crate::report::ReportContext;

static MODEL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"model name\s*:\s*(.+)").unwrap());

/// Overall-status summary: node counts, release, cluster state, dominant
/// platform/CPU/memory figures, and database object totals.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let (all, coor) = db::node_counts(conn, system)?;
    let data = all - coor;

    let version = db::fetch_sys_row(conn, system)?
        .and_then(|s| s.gbase_version)
        .unwrap_or_default();

    let (state, mode) = match db::first_cluster_state(conn, system)? {
        Some(v) => v,
        None => {
            warn!("{system}: 没有找到数据集群记录");
            (String::new(), String::new())
        }
    };

    let platform = db::majority_os(conn, system)?.unwrap_or_default();

    let (model, logic, physical) = match db::majority_cpu(conn, system)? {
        Some((m, l, p)) => (
            m.unwrap_or_default(),
            l.unwrap_or_default(),
            p.unwrap_or_default(),
        ),
        None => Default::default(),
    };
    let model_name = MODEL_NAME_RE
        .captures(&model)
        .map(|c| c[1].trim().to_string())
        .unwrap_or(model);

    let (cmem, cswap) = mem_pair(db::majority_memory(conn, system, true)?);
    let (nmem, nswap) = mem_pair(db::majority_memory(conn, system, false)?);

    let dbsize = match db::data_disk_sums(conn, system)? {
        Some((total, used)) if total > 0.0 => {
            let percent = round4(used / total * 100.0);
            let used_tb = round4(used / 1024.0 / 1024.0 / 1024.0);
            format!("{used_tb}\n({percent}%)")
        }
        _ => INSUFFICIENT_DATA.to_string(),
    };

    let objects = db::object_counts(conn, system)?;

    println!("=============== 总体运行情况 ===============");
    println!("Name:\t{system}");
    println!("Nodes:\t{all},{coor},{data}");
    println!("Release:\t{version}");
    println!("State:\t{state}  Mode:\t{mode}");
    println!("Platform:\t{platform}");
    println!("CPU:\tModel Name: {model_name}, Count: {physical}, Cores: {logic}");
    println!("CoorMemTotal:\tMEM: {cmem}, Swap: {cswap}");
    println!("NodeMemTotal:\tMEM: {nmem}, Swap: {nswap}");

    ctx.set("ALL_NODE_C", format!("ALL: {all}\nGC: {coor}\nGN: {data}"));
    ctx.set("RELESE", version);
    ctx.set("GSTATE", state);
    ctx.set("GMODE", mode);
    ctx.set("PLATFORM", platform);
    ctx.set("CPU", format!("{model_name}\n{physical}\n{logic}"));
    ctx.set(
        "MEMORY",
        format!("Coor: {cmem}, Data: {nmem}\nCoor: {cswap}, Data: {nswap}"),
    );
    ctx.set("DBSIZE", dbsize);
    ctx.set("DNUM", format_count(objects.databases));
    ctx.set("TNUM", format_count(objects.tables));
    ctx.set("VNUM", format_count(objects.views));
    ctx.set("PNUM", format_count(objects.procs));
    ctx.set("FNUM", format_count(objects.funcs));
    Ok(())
}

fn mem_pair(row: Option<(Option<String>, Option<String>)>) -> (String, String) {
    match row {
        Some((mem, swap)) => (mem.unwrap_or_default(), swap.unwrap_or_default()),
        None => (String::new(), String::new()),
    }
}

/// SQLite sums come back as floats; whole values render without a fraction.
fn format_count(v: Option<f64>) -> String {
    match v {
        None => String::new(),
        Some(x) if x.fract() == 0.0 => format!("{}", x as i64),
        Some(x) => x.to_string(),
    }
}

// ── Tests ──
