use crate::db::LogRow;
use crate::parser::lines;
use crate::parser::sections;

fn rows_from(text: &str, system: &str, cluster: &str) -> Vec<LogRow> {
    lines::du_rows(text)
        .into_iter()
        .map(|r| LogRow {
            system_name: system.to_string(),
            cluster_name: cluster.to_string(),
            ip_address: r.ip,
            log_used: r.size,
            log_path: r.path,
        })
        .collect()
}

pub fn coor(section: &str, system: &str) -> Vec<LogRow> {
    sections::field(section, "* 管理节点日志大小：")
        .map(|text| rows_from(&text, system, "coor"))
        .unwrap_or_default()
}

pub fn data(section: &str, system: &str, vc: &str) -> Vec<LogRow> {
    sections::field(section, "* Data Cluster 日志情况:")
        .map(|text| rows_from(&text, system, vc))
        .unwrap_or_default()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn du_observations() {
        let section = "\
* 管理节点日志大小：
coor 10.0.0.1: 5.3M /opt/gcluster/log/gcluster/system.log
coor 10.0.0.1: du: cannot access '/opt/x': No such file or directory
coor 10.0.0.1: 2.1G /opt/gcluster/log/gcluster/express.log
* 自启动设置：
ignored";
        let rows = coor(section, "SYS-A");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].log_used, "5.3M");
        assert_eq!(rows[1].log_path, "/opt/gcluster/log/gcluster/express.log");
    }
}
