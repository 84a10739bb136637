use anyhow::Result;
use rusqlite::Connection;

use crate::db;
use crate::parser::merge::IpMerged;
use crate::report::{ReportContext, ReportTable};

#[derive(Default)]
struct NodeServices {
    cluster: String,
    hostname: String,
    gcware: bool,
    gcluster: bool,
}

/// Autostart rule: coordinator nodes need both gcware and gcluster service
/// entries; data nodes need gcluster and must NOT have gcware.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let mut nodes: IpMerged<NodeServices> = IpMerged::new();
    for (cluster, hostname, ip, cmd) in db::autostart_rows(conn, system)? {
        let e = nodes.entry(&ip);
        if e.cluster.is_empty() {
            e.cluster = cluster;
        }
        if e.hostname.is_empty() {
            e.hostname = hostname;
        }
        if cmd.contains("gcware_services") {
            e.gcware = true;
        } else if cmd.contains("gcluster_services") {
            e.gcluster = true;
        }
    }

    println!("=============== 集群自启动诊断 ===============");
    let mut alarms = Vec::new();
    let mut table = ReportTable::new(
        "自启动配置",
        &["序号", "ip_address", "gcware_services", "gcluster_services"],
    );

    for (ip, node) in nodes.into_rows() {
        let mut problems: Vec<&str> = Vec::new();
        if node.cluster == "coor" {
            if !node.gcware {
                problems.push("coor 节点缺少 gcware 服务");
            }
            if !node.gcluster {
                problems.push("coor 节点缺少 gcluster 服务");
            }
        } else {
            if !node.gcluster {
                problems.push("非 coor 节点缺少 gcluster 服务");
            }
            if node.gcware {
                problems.push("非 coor 节点不应启用 gcware 服务");
            }
        }
        if !problems.is_empty() {
            alarms.push(format!(
                "{} ({}): {}",
                node.hostname,
                ip,
                problems.join(", ")
            ));
        }

        table.push_numbered(vec![
            ip,
            if node.gcware { "1".into() } else { String::new() },
            if node.gcluster { "1".into() } else { String::new() },
        ]);
    }

    if alarms.is_empty() {
        println!("✅ 所有服务自启动状态正常");
        ctx.set("ALARM_AUTO_START", "服务自启动状态正常");
    } else {
        println!("⚠️ 自启动服务异常，异常节点：");
        for a in &alarms {
            println!("  {a}");
        }
        ctx.set("ALARM_AUTO_START", "自启动服务异常");
    }
    ctx.add_table(table);
    Ok(())
}

// ── Tests ──
