use anyhow::Result;
use rusqlite::Connection;

use crate::db;
use crate::report::ReportContext;
use crate::units::to_number;

const TOLERANCE: f64 = 1e-6;

/// Variable-conformance rule: reference and actual values are parsed with
/// the shared size parser and must agree within tolerance. Unparseable
/// values are themselves deviations.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let rows = db::variable_rows(conn, system)?;

    println!("=============== 集群参数诊断 ===============");
    if rows.is_empty() {
        println!("⚠️ 没有可用的参数数据");
        ctx.set("ALARM_VARIABLES", "没有可用的参数数据");
        return Ok(());
    }

    let mut alerts = Vec::new();
    for (ip, name, reference, actual) in rows {
        let reason = match (to_number(&reference), to_number(&actual)) {
            (None, _) => Some("参考值为空或无效"),
            (_, None) => Some("实际值为空或格式无法解析"),
            (Some(r), Some(a)) if (r - a).abs() > TOLERANCE => Some("实际值与参考值不一致"),
            _ => None,
        };
        if let Some(reason) = reason {
            alerts.push(format!(
                "{ip} {name}: 参考值 {reference}, 实际值 {actual} ({reason})"
            ));
        }
    }

    if alerts.is_empty() {
        println!("✅ 所有集群参数均正常，无异常告警。");
        ctx.set("ALARM_VARIABLES", "集群参数均正常");
    } else {
        println!("⚠️ 以下集群参数存在异常：");
        for a in &alerts {
            println!("  {a}");
        }
        ctx.set("ALARM_VARIABLES", "集群参数存在异常");
    }
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FileExtract, VariableRow};

    fn seeded(vars: &[(&str, &str, &str)]) -> rusqlite::Connection {
        let conn = db::open_in_memory().unwrap();
        db::save_extract(
            &conn,
            &FileExtract {
                system_name: "SYS-A".into(),
                variables: vars
                    .iter()
                    .map(|(name, reference, actual)| VariableRow {
                        system_name: "SYS-A".into(),
                        cluster_name: "coor".into(),
                        ip_address: "10.0.0.1".into(),
                        var_name: name.to_string(),
                        var_reference: reference.to_string(),
                        config_file: String::new(),
                        var_actual: actual.to_string(),
                    })
                    .collect(),
                ..Default::default()
            },
        )
        .unwrap();
        conn
    }

    #[test]
    fn matching_values_pass() {
        // 30G and 30720M normalize to the same byte count
        let conn = seeded(&[("gbase_memory_limit", "30G", "30720M"), ("x", "1", "1")]);
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_VARIABLES"), Some("集群参数均正常"));
    }

    #[test]
    fn mismatch_flagged() {
        let conn = seeded(&[("gbase_memory_limit", "30G", "28G")]);
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_VARIABLES"), Some("集群参数存在异常"));
    }

    #[test]
    fn unparseable_reference_flagged() {
        let conn = seeded(&[("gbase_mode", "auto", "auto")]);
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_VARIABLES"), Some("集群参数存在异常"));
    }

    #[test]
    fn no_rows_is_reported() {
        let conn = db::open_in_memory().unwrap();
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_VARIABLES"), Some("没有可用的参数数据"));
    }
}
