use anyhow::Result;
use rusqlite::Connection;
use tracing::warn;

use super::{round4, INSUFFICIENT_DATA};
use crate::db;
use crate::report::{ReportContext, ReportTable};

/// Space-availability rule: usable capacity is 80% of the raw total; alarm
/// when usage exceeds 80%. A system with no data-node disk rows gets the
/// insufficient-data verdict instead of a division.
pub fn check(conn: &Connection, system: &str, ctx: &mut ReportContext) -> Result<()> {
    let node_count = db::data_node_count(conn, system)?;
    println!("=============== 集群空间可用性 ===============");

    match db::data_disk_sums(conn, system)? {
        Some((total, used)) if total > 0.0 => {
            let percent = used / total * 100.0;
            let total_tb = total / 1024.0 / 1024.0 / 1024.0;
            let usable_tb = total_tb * 0.8;
            let used_tb = used / 1024.0 / 1024.0 / 1024.0;

            if percent > 80.0 {
                println!("⚠️ {system}: 集群空间大于80%，建议清理空间或者扩容");
                ctx.set("ALARM_DISK_USEING", "集群空间大于80%，建议清理空间或者扩容");
            } else {
                ctx.set("ALARM_DISK_USEING", "集群空间小于80%，集群空间使用正常");
            }
            println!(
                "集群共有{node_count}个数据节点，合计{}TB存储空间，实际可存储空间约为{}TB，目前已使用约{}TB，约占总空间的{}%。",
                round4(total_tb),
                round4(usable_tb),
                round4(used_tb),
                round4(percent),
            );

            ctx.set("NDOSK_T", round4(total_tb));
            ctx.set("NDOSK_A", round4(usable_tb));
            ctx.set("NDISK_U", round4(used_tb));
            ctx.set("PERCENT", round4(percent));
        }
        _ => {
            warn!("{system}: 没有找到数据节点磁盘记录");
            println!("{system}: {INSUFFICIENT_DATA}");
            ctx.set("ALARM_DISK_USEING", INSUFFICIENT_DATA);
            for key in ["NDOSK_T", "NDOSK_A", "NDISK_U", "PERCENT"] {
                ctx.set(key, "");
            }
        }
    }
    ctx.set("NODE_COUNT", node_count.to_string());

    let mut table = ReportTable::new(
        "数据节点空间使用",
        &["序号", "hostname", "ip_address", "disk_size", "disk_used", "disk_avail", "disk_use_per"],
    );
    for r in db::disk_node_rows(conn, system)? {
        table.push_numbered(vec![
            r.hostname,
            r.ip_address,
            r.disk_size,
            r.disk_used,
            r.disk_avail,
            r.disk_use_per,
        ]);
    }
    ctx.add_table(table);
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ClusterDiskRow, FileExtract};

    fn with_disks(total: &str, used: &str) -> rusqlite::Connection {
        let conn = db::open_in_memory().unwrap();
        db::save_extract(
            &conn,
            &FileExtract {
                system_name: "SYS-A".into(),
                cluster_disks: vec![ClusterDiskRow {
                    system_name: "SYS-A".into(),
                    cluster_name: "vc1".into(),
                    disk_total: total.into(),
                    disk_used: used.into(),
                    disk_avail: "".into(),
                    disk_use_per: "".into(),
                }],
                ..Default::default()
            },
        )
        .unwrap();
        conn
    }

    #[test]
    fn over_eighty_percent_alarms() {
        let conn = with_disks("1000", "850");
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("PERCENT"), Some("85.0000"));
        assert!(ctx.get("ALARM_DISK_USEING").unwrap().contains("大于80%"));
    }

    #[test]
    fn under_eighty_percent_is_normal() {
        let conn = with_disks("1000", "700");
        let mut ctx = ReportContext::default();
        check(&conn, "SYS-A", &mut ctx).unwrap();
        assert_eq!(ctx.get("PERCENT"), Some("70.0000"));
        assert!(ctx.get("ALARM_DISK_USEING").unwrap().contains("正常"));
    }

    #[test]
    fn no_rows_is_insufficient_data() {
        let conn = db::open_in_memory().unwrap();
        let mut ctx = ReportContext::default();
        check(&conn, "GHOST", &mut ctx).unwrap();
        assert_eq!(ctx.get("ALARM_DISK_USEING"), Some(INSUFFICIENT_DATA));
        assert_eq!(ctx.get("PERCENT"), Some(""));
        assert_eq!(ctx.get("NODE_COUNT"), Some("0"));
    }
}
