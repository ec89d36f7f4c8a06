//! Policy for the AWS EBS CSI driver controller.

use crate::types::{ANY, ConditionOperator, PolicyDocument, StatementEntry};

const CSI_ACTIONS: &[&str] = &[
    "ec2:CreateSnapshot",
    "ec2:AttachVolume",
    "ec2:DetachVolume",
    "ec2:ModifyVolume",
    "ec2:DescribeAvailabilityZones",
    "ec2:DescribeInstances",
    "ec2:DescribeSnapshots",
    "ec2:DescribeTags",
    "ec2:DescribeVolumes",
    "ec2:DescribeVolumesModifications",
];

const VOLUME_AND_SNAPSHOT: [&str; 2] = ["arn:*:ec2:*:*:volume/*", "arn:*:ec2:*:*:snapshot/*"];

fn tagged(action: &str, key: &str, value: &str) -> StatementEntry {
    StatementEntry::allow([action], [ANY]).with_condition(
        ConditionOperator::string_like(),
        key,
        value,
    )
}

pub fn csi_policy() -> PolicyDocument {
    PolicyDocument::new(vec![
        StatementEntry::allow(CSI_ACTIONS.iter().copied(), [ANY]),
        StatementEntry::allow(["ec2:CreateTags"], VOLUME_AND_SNAPSHOT).with_condition(
            ConditionOperator::string_equals(),
            "ec2:CreateAction",
            serde_json::json!(["CreateVolume", "CreateSnapshot"]),
        ),
        StatementEntry::allow(["ec2:DeleteTags"], VOLUME_AND_SNAPSHOT),
        tagged("ec2:CreateVolume", "aws:RequestTag/ebs.csi.aws.com/cluster", "true"),
        tagged("ec2:CreateVolume", "aws:RequestTag/CSIVolumeName", "*"),
        tagged("ec2:DeleteVolume", "ec2:ResourceTag/ebs.csi.aws.com/cluster", "true"),
        tagged("ec2:DeleteVolume", "ec2:ResourceTag/CSIVolumeName", "*"),
        tagged(
            "ec2:DeleteVolume",
            "ec2:ResourceTag/kubernetes.io/created-for/pvc/name",
            "*",
        ),
        tagged("ec2:DeleteSnapshot", "ec2:ResourceTag/CSIVolumeSnapshotName", "*"),
        tagged("ec2:DeleteSnapshot", "ec2:ResourceTag/ebs.csi.aws.com/cluster", "true"),
    ])
}
