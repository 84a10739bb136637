use anyhow::Result;
use rusqlite::Connection;

use crate::db;
use crate::report::{ReportContext, ReportTable};

/// Component-state rule: topology fields must be OPEN (case-insensitive)
/// when present, datastate must be 0 when present. Absent fields are not
/// deviations — partial instance rows are expected.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let rows = db::instance_rows(conn, system)?;

    println!("=============== 集群实例诊断 ===============");
    let mut alarms = Vec::new();
    let mut table = ReportTable::new(
        "实例拓扑状态",
        &["序号", "namenode", "ip_address", "gcware", "gcluster", "gnode", "syncserver", "datastate"],
    );

    for r in &rows {
        let mut problems: Vec<&str> = Vec::new();
        for (name, value) in [
            ("gcware", &r.gcware),
            ("gcluster", &r.gcluster),
            ("gnode", &r.gnode),
            ("syncserver", &r.syncserver),
        ] {
            if let Some(v) = value {
                if !v.trim().eq_ignore_ascii_case("OPEN") {
                    problems.push(name);
                }
            }
        }
        if let Some(v) = &r.datastate {
            if v.trim() != "0" {
                problems.push("datastate");
            }
        }
        if !problems.is_empty() {
            alarms.push(format!(
                "{} ({}): {}",
                r.namenode,
                r.ip_address,
                problems.join(", ")
            ));
        }

        table.push_numbered(vec![
            r.namenode.clone(),
            r.ip_address.clone(),
            r.gcware.clone().unwrap_or_default(),
            r.gcluster.clone().unwrap_or_default(),
            r.gnode.clone().unwrap_or_default(),
            r.syncserver.clone().unwrap_or_default(),
            r.datastate.clone().unwrap_or_default(),
        ]);
    }

    if alarms.is_empty() {
        println!("✅ 所有组件状态正常");
        ctx.set("ALARM_INSTANCE", "所有组件状态正常");
    } else {
        println!("⚠️ 以下节点存在异常组件状态：");
        for a in &alarms {
            println!("  {a}");
        }
        ctx.set("ALARM_INSTANCE", "节点存在异常组件状态");
    }
    ctx.add_table(table);
    Ok(())
}

// ── Tests ──
