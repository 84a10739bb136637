use std::collections::BTreeSet;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use rusqlite::Connection;

use crate::db;
use crate::parser::merge::IpMerged;
use crate::report::{ReportContext, ReportTable};

static COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/\s]+)(?:\s|$)").unwrap());

pub const ALL_COMPONENTS: [&str; 6] = [
    "gclusterd",
    "gcrecover",
    "gcmonit",
    "gcmmonit",
    "gbased",
    "gc_sync_server",
];
const COOR_REQUIRED: [&str; 4] = ["gclusterd", "gcrecover", "gcmonit", "gcmmonit"];
const DATA_REQUIRED: [&str; 4] = ["gcmonit", "gcmmonit", "gbased", "gc_sync_server"];

#[derive(Default)]
struct NodeProcs {
    hostname: String,
    cluster: String,
    components: BTreeSet<String>,
}

/// Process-completeness rule: every node must run its role's required
/// component set. The component is the last path segment of the command's
/// first `/`-rooted token.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let mut nodes: IpMerged<NodeProcs> = IpMerged::new();
    for (hostname, cluster, ip, cmd) in db::process_rows(conn, system)? {
        let e = nodes.entry(&ip);
        if e.hostname.is_empty() {
            e.hostname = hostname;
        }
        if e.cluster.is_empty() {
            e.cluster = cluster;
        }
        if let Some(c) = COMPONENT_RE.captures(&cmd) {
            e.components.insert(c[1].to_string());
        }
    }

    println!("=============== 集群进程诊断 ===============");
    let mut alarms = Vec::new();
    let mut table = ReportTable::new(
        "进程部署情况",
        &["序号", "ip_address", "gclusterd", "gcrecover", "gcmonit", "gcmmonit", "gbased", "gc_sync_server"],
    );

    for (ip, node) in nodes.into_rows() {
        let required: &[&str] = if node.cluster == "coor" {
            &COOR_REQUIRED
        } else {
            &DATA_REQUIRED
        };
        let missing: Vec<&str> = required
            .iter()
            .filter(|c| !node.components.contains(**c))
            .copied()
            .collect();
        if !missing.is_empty() {
            alarms.push(format!(
                "{} ({}): 缺少组件 {}",
                node.hostname,
                ip,
                missing.join(", ")
            ));
        }

        let mut cells = vec![ip];
        for comp in ALL_COMPONENTS {
            cells.push(if node.components.contains(comp) {
                "1".to_string()
            } else {
                String::new()
            });
        }
        table.push_numbered(cells);
    }

    if alarms.is_empty() {
        println!("所有主机组件均部署完整。");
        ctx.set("ALARM_PROCE", "所有主机组件均部署完整");
    } else {
        println!("以下主机存在缺失组件：");
        for a in &alarms {
            println!("  {a}");
        }
        ctx.set("ALARM_PROCE", "主机存在缺失组件");
    }
    ctx.add_table(table);
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FileExtract, MachineRow, ProcessRow};

    fn seeded(cluster: &str, cmds: &[&str]) -> rusqlite::Connection {
        let conn = db::open_in_memory().unwrap();
        db::save_extract(
            &conn,
            &FileExtract {
                system_name: "SYS-A".into(),
                machines: vec![MachineRow {
                    system_name: "SYS-A".into(),
                    cluster_name: cluster.into(),
                    ip_address: "10.0.0.1".into(),
                    hostname: Some("gc01".into()),
                    ..Default::default()
                }],
                processes: cmds
                    .iter()
                    .map(|cmd| ProcessRow {
                        system_name: "SYS-A".into(),
                        cluster_name: cluster.into(),
                        ip_address: "10.0.0.1".into(),
                        process_cmd: cmd.to_string(),
                    })
                    .collect(),
                ..Default::default()
            },
        )
        .unwrap();
        conn
    }

    #[test]
    fn complete_coor_node_passes() {
        let conn = seeded(
            "coor",
            &[
                "/opt/gcluster/server/bin/gclusterd --defaults-file=/opt/my.cnf",
                "/opt/gcluster/server/bin/gcrecover",
                "/opt/gcmonit/gcmonit",
                "/opt/gcmonit/gcmmonit",
            ],
        );
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_PROCE"), Some("所有主机组件均部署完整"));
        let table = &ctx.tables[0];
        assert_eq!(table.rows[0][2], "1"); // gclusterd present
        assert_eq!(table.rows[0][6], ""); // gbased not expected nor observed
    }

    #[test]
    fn data_node_missing_component_flagged() {
        let conn = seeded(
            "vc1",
            &[
                "/opt/gcmonit/gcmonit",
                "/opt/gcmonit/gcmmonit",
                "/opt/gnode/server/bin/gbased",
            ],
        );
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_PROCE"), Some("主机存在缺失组件"));
    }
}
