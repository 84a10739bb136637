use crate::db::ClusterDiskRow;
use crate::parser::sections;

pub const COOR_KEYWORDS: [&str; 4] = [
    "管理节点总空间之和",
    "管理节点已使用空间之和",
    "管理节点剩余用空间之和",
    "管理集群空间总使用率",
];

pub const DATA_KEYWORDS: [&str; 4] = [
    "计算集群空间之和",
    "计算集群已使用空间之和",
    "计算集群剩余用空间之和",
    "计算集群空间总使用率",
];

/// Aggregate disk figures for one cluster role: each keyword line is
/// followed by its value line. Missing keywords leave the value empty.
pub fn extract(
    section: &str,
    system: &str,
    cluster: &str,
    keywords: &[&str; 4],
) -> ClusterDiskRow {
    let values = sections::next_line_values(section, keywords);
    ClusterDiskRow {
        system_name: system.to_string(),
        cluster_name: cluster.to_string(),
        disk_total: values[0].clone(),
        disk_used: values[1].clone(),
        disk_avail: values[2].clone(),
        disk_use_per: values[3].clone(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_next_line_values() {
        let section = "\
* 计算集群空间情况：
计算集群空间之和
10485760
计算集群已使用空间之和
5242880
计算集群剩余用空间之和
5242880
计算集群空间总使用率
50%";
        let row = extract(section, "SYS-A", "vc1", &DATA_KEYWORDS);
        assert_eq!(row.disk_total, "10485760");
        assert_eq!(row.disk_used, "5242880");
        assert_eq!(row.disk_use_per, "50%");
    }

    #[test]
    fn missing_keyword_leaves_empty() {
        let row = extract("nothing here", "SYS-A", "coor", &COOR_KEYWORDS);
        assert_eq!(row.disk_total, "");
        assert_eq!(row.cluster_name, "coor");
    }
}
