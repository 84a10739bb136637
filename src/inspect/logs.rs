use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;

use crate::db;
use crate::parser::merge::IpMerged;
use crate::report::{ReportContext, ReportTable};
use crate::units::size_to_gb;

/// Column order of the log matrix handed to the renderer.
pub const LOG_TYPES: [&str; 7] = [
    "system",
    "express",
    "gcrecover",
    "gc_sync_server",
    "dump",
    "core",
    "loader_logs",
];

const THRESHOLD_GB: f64 = 800.0;

fn log_type(path: &str) -> Option<&'static str> {
    let p = path.to_lowercase();
    if p.contains("system") {
        Some("system")
    } else if p.contains("express") {
        Some("express")
    } else if p.contains("gcrecover") {
        Some("gcrecover")
    } else if p.contains("gc_sync_server") {
        Some("gc_sync_server")
    } else if p.contains("core") {
        Some("core")
    } else if p.contains("dump") {
        Some("dump")
    } else if p.contains("loader") {
        Some("loader_logs")
    } else {
        None
    }
}

#[derive(Default)]
struct NodeLogs {
    hostname: String,
    sizes: HashMap<&'static str, String>,
}

/// Log-size rule: per-category sizes are normalized to gigabytes and any
/// category above 800 GB is flagged. The first observation per category
/// wins; unknown paths are ignored.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let mut nodes: IpMerged<NodeLogs> = IpMerged::new();
    for (hostname, ip, used, path) in db::log_rows(conn, system)? {
        let Some(kind) = log_type(&path) else {
            continue;
        };
        let e = nodes.entry(&ip);
        if e.hostname.is_empty() {
            e.hostname = hostname;
        }
        e.sizes.entry(kind).or_insert(used);
    }

    println!("=============== 集群日志清理诊断 ===============");
    let mut alarms = Vec::new();
    let mut table = ReportTable::new(
        "日志大小情况",
        &["序号", "ip_address", "system", "express", "gcrecover", "gc_sync_server", "dump", "core", "loader_logs"],
    );

    for (ip, node) in nodes.into_rows() {
        let oversized: Vec<&str> = LOG_TYPES
            .iter()
            .filter(|t| {
                let size = node.sizes.get(*t).map(String::as_str).unwrap_or("0");
                size_to_gb(size) > THRESHOLD_GB
            })
            .copied()
            .collect();
        if !oversized.is_empty() {
            alarms.push(format!(
                "{} ({}): {}",
                node.hostname,
                ip,
                oversized.join(", ")
            ));
        }

        let mut cells = vec![ip];
        for t in LOG_TYPES {
            cells.push(node.sizes.get(t).cloned().unwrap_or_else(|| "0".to_string()));
        }
        table.push_numbered(cells);
    }

    if alarms.is_empty() {
        println!("✅ 所有日志文件都未超过 {THRESHOLD_GB} GB");
        ctx.set("ALARM_LOGS_SIZE", "日志文件正常");
    } else {
        println!("⚠️ 以下主机存在日志文件超过 {THRESHOLD_GB} GB：");
        for a in &alarms {
            println!("  {a}");
        }
        ctx.set("ALARM_LOGS_SIZE", format!("存在日志文件超过 {THRESHOLD_GB} GB"));
    }
    ctx.add_table(table);
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FileExtract, LogRow, MachineRow};

    fn seeded(observations: &[(&str, &str)]) -> rusqlite::Connection {
        let conn = db::open_in_memory().unwrap();
        db::save_extract(
            &conn,
            &FileExtract {
                system_name: "SYS-A".into(),
                machines: vec![MachineRow {
                    system_name: "SYS-A".into(),
                    cluster_name: "coor".into(),
                    ip_address: "10.0.0.1".into(),
                    hostname: Some("gc01".into()),
                    ..Default::default()
                }],
                logs: observations
                    .iter()
                    .map(|(size, path)| LogRow {
                        system_name: "SYS-A".into(),
                        cluster_name: "coor".into(),
                        ip_address: "10.0.0.1".into(),
                        log_used: size.to_string(),
                        log_path: path.to_string(),
                    })
                    .collect(),
                ..Default::default()
            },
        )
        .unwrap();
        conn
    }

    #[test]
    fn small_logs_pass() {
        let conn = seeded(&[
            ("5.3M", "/opt/gcluster/log/gcluster/system.log"),
            ("2.1G", "/opt/gcluster/log/gcluster/express.log"),
        ]);
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_LOGS_SIZE"), Some("日志文件正常"));
        let row = &ctx.tables[0].rows[0];
        assert_eq!(row[2], "5.3M"); // system column
        assert_eq!(row[3], "2.1G"); // express column
    }

    #[test]
    fn two_terabytes_alarm() {
        // 2T = 2048 GB, over the 800 GB line
        let conn = seeded(&[("2T", "/opt/gcluster/log/gcluster/express.log")]);
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert!(ctx.get("ALARM_LOGS_SIZE").unwrap().contains("超过"));
    }

    #[test]
    fn exactly_threshold_does_not_alarm() {
        let conn = seeded(&[("800G", "/opt/gcluster/log/gcluster/express.log")]);
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_LOGS_SIZE"), Some("日志文件正常"));
    }

    #[test]
    fn unknown_paths_ignored() {
        let conn = seeded(&[("9T", "/var/lib/something/else.txt")]);
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_LOGS_SIZE"), Some("日志文件正常"));
        assert!(ctx.tables[0].rows.is_empty());
    }
}
