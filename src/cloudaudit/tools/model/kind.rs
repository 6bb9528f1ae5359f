//! Source table kinds and the signatures used to recognise them.
//!
//! Each kind maps to one relational table of the inventory query layer and,
//! for most kinds, to the exact header line of its CSV export. The header
//! lines are matched verbatim, so they must not be reformatted.

use std::fmt;

/// One kind of source table that feeds the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Alb,
    Nlb,
    LoadBalancerListener,
    AutoScalingGroup,
    CloudFrontDistribution,
    DocDbCluster,
    DocDbInstance,
    ElastiCacheCluster,
    ElastiCacheReplicationGroup,
    Ec2Instance,
    EbsVolume,
    IamGroup,
    IamRole,
    IamUser,
    NetworkAcl,
    RouteTable,
    S3Bucket,
    SecurityGroup,
    SecurityGroupRule,
    Subnet,
    TargetGroup,
    Vpc,
    InternetGateway,
    NatGateway,
    TransitGateway,
    RdsCluster,
    RdsInstance,
    CloudWatchMetric,
    VpcEndpoint,
    PeeringConnection,
}

impl ResourceKind {
    /// Every kind, in a stable order used when loading sources.
    pub const ALL: [ResourceKind; 30] = [
        ResourceKind::Alb,
        ResourceKind::Nlb,
        ResourceKind::LoadBalancerListener,
        ResourceKind::AutoScalingGroup,
        ResourceKind::CloudFrontDistribution,
        ResourceKind::DocDbCluster,
        ResourceKind::DocDbInstance,
        ResourceKind::ElastiCacheCluster,
        ResourceKind::ElastiCacheReplicationGroup,
        ResourceKind::Ec2Instance,
        ResourceKind::EbsVolume,
        ResourceKind::IamGroup,
        ResourceKind::IamRole,
        ResourceKind::IamUser,
        ResourceKind::NetworkAcl,
        ResourceKind::RouteTable,
        ResourceKind::S3Bucket,
        ResourceKind::SecurityGroup,
        ResourceKind::SecurityGroupRule,
        ResourceKind::Subnet,
        ResourceKind::TargetGroup,
        ResourceKind::Vpc,
        ResourceKind::InternetGateway,
        ResourceKind::NatGateway,
        ResourceKind::TransitGateway,
        ResourceKind::RdsCluster,
        ResourceKind::RdsInstance,
        ResourceKind::CloudWatchMetric,
        ResourceKind::VpcEndpoint,
        ResourceKind::PeeringConnection,
    ];

    /// Short key used for file stems and log output.
    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::Alb => "alb",
            ResourceKind::Nlb => "nlb",
            ResourceKind::LoadBalancerListener => "lbl",
            ResourceKind::AutoScalingGroup => "autoscaling",
            ResourceKind::CloudFrontDistribution => "cloudfront",
            ResourceKind::DocDbCluster => "docdbcluster",
            ResourceKind::DocDbInstance => "docdbinstance",
            ResourceKind::ElastiCacheCluster => "ec",
            ResourceKind::ElastiCacheReplicationGroup => "ecrep",
            ResourceKind::Ec2Instance => "ec2",
            ResourceKind::EbsVolume => "ebs",
            ResourceKind::IamGroup => "iamgroup",
            ResourceKind::IamRole => "iamrole",
            ResourceKind::IamUser => "iamuser",
            ResourceKind::NetworkAcl => "nacls",
            ResourceKind::RouteTable => "rt",
            ResourceKind::S3Bucket => "s3",
            ResourceKind::SecurityGroup => "sg",
            ResourceKind::SecurityGroupRule => "sgrule",
            ResourceKind::Subnet => "subnet",
            ResourceKind::TargetGroup => "tg",
            ResourceKind::Vpc => "vpc",
            ResourceKind::InternetGateway => "vpcigw",
            ResourceKind::NatGateway => "ngw",
            ResourceKind::TransitGateway => "tgw",
            ResourceKind::RdsCluster => "rdscluster",
            ResourceKind::RdsInstance => "rdsinstance",
            ResourceKind::CloudWatchMetric => "cloudwatch",
            ResourceKind::VpcEndpoint => "vep",
            ResourceKind::PeeringConnection => "pc",
        }
    }

    /// Table name in the relational query layer.
    pub fn table_name(self) -> &'static str {
        match self {
            ResourceKind::Alb => "aws_ec2_application_load_balancer",
            ResourceKind::Nlb => "aws_ec2_network_load_balancer",
            ResourceKind::LoadBalancerListener => "aws_ec2_load_balancer_listener",
            ResourceKind::AutoScalingGroup => "aws_ec2_autoscaling_group",
            ResourceKind::CloudFrontDistribution => "aws_cloudfront_distribution",
            ResourceKind::DocDbCluster => "aws_docdb_cluster",
            ResourceKind::DocDbInstance => "aws_docdb_cluster_instance",
            ResourceKind::ElastiCacheCluster => "aws_elasticache_cluster",
            ResourceKind::ElastiCacheReplicationGroup => "aws_elasticache_replication_group",
            ResourceKind::Ec2Instance => "aws_ec2_instance",
            ResourceKind::EbsVolume => "aws_ebs_volume",
            ResourceKind::IamGroup => "aws_iam_group",
            ResourceKind::IamRole => "aws_iam_role",
            ResourceKind::IamUser => "aws_iam_user",
            ResourceKind::NetworkAcl => "aws_vpc_network_acl",
            ResourceKind::RouteTable => "aws_vpc_route_table",
            ResourceKind::S3Bucket => "aws_s3_bucket",
            ResourceKind::SecurityGroup => "aws_vpc_security_group",
            ResourceKind::SecurityGroupRule => "aws_vpc_security_group_rule",
            ResourceKind::Subnet => "aws_vpc_subnet",
            ResourceKind::TargetGroup => "aws_ec2_target_group",
            ResourceKind::Vpc => "aws_vpc",
            ResourceKind::InternetGateway => "aws_vpc_internet_gateway",
            ResourceKind::NatGateway => "aws_vpc_nat_gateway",
            ResourceKind::TransitGateway => "aws_ec2_transit_gateway",
            ResourceKind::RdsCluster => "aws_rds_db_cluster",
            ResourceKind::RdsInstance => "aws_rds_db_instance",
            ResourceKind::CloudWatchMetric => "aws_cloudwatch_metric",
            ResourceKind::VpcEndpoint => "aws_vpc_endpoint",
            ResourceKind::PeeringConnection => "aws_vpc_peering_connection",
        }
    }

    /// Header line of the CSV export, when the export format is known.
    pub fn csv_header(self) -> Option<&'static str> {
        match self {
            ResourceKind::Alb => Some(ALB_HEADER),
            ResourceKind::Nlb => Some(NLB_HEADER),
            ResourceKind::AutoScalingGroup => Some(AUTOSCALING_HEADER),
            ResourceKind::CloudFrontDistribution => Some(CLOUDFRONT_HEADER),
            ResourceKind::DocDbCluster => Some(DOCDBCLUSTER_HEADER),
            ResourceKind::DocDbInstance => Some(DOCDBINSTANCE_HEADER),
            ResourceKind::ElastiCacheCluster => Some(EC_HEADER),
            ResourceKind::ElastiCacheReplicationGroup => Some(ECREP_HEADER),
            ResourceKind::Ec2Instance => Some(EC2_HEADER),
            ResourceKind::IamGroup => Some(IAMGROUP_HEADER),
            ResourceKind::IamRole => Some(IAMROLE_HEADER),
            ResourceKind::IamUser => Some(IAMUSER_HEADER),
            ResourceKind::NetworkAcl => Some(NACLS_HEADER),
            ResourceKind::RouteTable => Some(RT_HEADER),
            ResourceKind::S3Bucket => Some(S3_HEADER),
            ResourceKind::SecurityGroup => Some(SG_HEADER),
            ResourceKind::SecurityGroupRule => Some(SGRULE_HEADER),
            ResourceKind::Subnet => Some(SUBNET_HEADER),
            ResourceKind::TargetGroup => Some(TG_HEADER),
            ResourceKind::Vpc => Some(VPC_HEADER),
            ResourceKind::InternetGateway => Some(VPCIGW_HEADER),
            ResourceKind::TransitGateway => Some(TGW_HEADER),
            ResourceKind::RdsCluster => Some(RDSCLUSTER_HEADER),
            ResourceKind::RdsInstance => Some(RDSINSTANCE_HEADER),
            ResourceKind::LoadBalancerListener
            | ResourceKind::EbsVolume
            | ResourceKind::NatGateway
            | ResourceKind::CloudWatchMetric
            | ResourceKind::VpcEndpoint
            | ResourceKind::PeeringConnection => None,
        }
    }

    /// Classifies a CSV export by its first line.
    pub fn from_csv_header(line: &str) -> Option<Self> {
        let line = line.trim_start_matches('\u{feff}').trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.csv_header() == Some(line))
    }

    /// Classifies a source by file stem, accepting either the short key or the
    /// relational table name.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        let stem = stem.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == stem || kind.table_name() == stem)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

const ALB_HEADER: &str = "Name,Arn,Type,Scheme,Canonical Hosted Zone ID,Vpc ID,Created Time,\
    Customer Owned Ipv4 Pool,Dns Name,IP Address Type,State Code,State Reason,\
    Availability Zones,Security Groups,Load Balancer Attributes,Tags Src,Tags,Title,\
    Akas,Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const NLB_HEADER: &str = "Name,Arn,Type,Scheme,Canonical Hosted Zone ID,Created Time,Customer Owned Ipv4 Pool,\
    Dns Name,IP Address Type,State Code,State Reason,Vpc ID,Availability Zones,\
    Security Groups,Load Balancer Attributes,Tags Src,Tags,Title,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";

const AUTOSCALING_HEADER: &str = "Name,Autoscaling Group Arn,Status,Created Time,\
    New Instances Protected From Scale In,Launch Configuration Name,Default Cooldown,\
    Desired Capacity,Max Instance Lifetime,Max Size,Min Size,Health Check Grace Period,\
    Health Check Type,Placement Group,Service Linked Role Arn,Vpc Zone Identifier,\
    Launch Template Name,Launch Template ID,Launch Template Version,\
    On Demand Allocation Strategy,On Demand Base Capacity,\
    On Demand Percentage Above Base Capacity,Spot Allocation Strategy,\
    Spot Instance Pools,Spot Max Price,Mixed Instances Policy Launch Template Name,\
    Mixed Instances Policy Launch Template ID,\
    Mixed Instances Policy Launch Template Version,\
    Mixed Instances Policy Launch Template Overrides,Availability Zones,\
    Load Balancer Names,Target Group Arns,Instances,Enabled Metrics,Policies,\
    Termination Policies,Suspended Processes,Tags Src,Tags,Title,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";

const CLOUDFRONT_HEADER: &str = "ID,Arn,Status,Caller Reference,Comment,Default Root Object,Domain Name,Enabled,\
    E Tag,Http Version,Is Ipv6 Enabled,In Progress Invalidation Batches,\
    Last Modified Time,Price Class,Web Acl ID,Active Trusted Key Groups,\
    Active Trusted Signers,Aliases,Alias Icp Recordals,Cache Behaviors,\
    Custom Error Responses,Default Cache Behavior,Logging,Origins,Origin Groups,\
    Restrictions,Tags Src,Viewer Certificate,Title,Tags,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";

const DOCDBCLUSTER_HEADER: &str = "Db Cluster Identifier,Arn,Status,Cluster Create Time,Backup Retention Period,\
    Clone Group ID,Db Cluster Parameter Group,Db Cluster Resource ID,Db Subnet Group,\
    Deletion Protection,Earliest Restorable Time,Endpoint,Engine,Engine Version,\
    Hosted Zone ID,Kms Key ID,Latest Restorable Time,Master User Name,Multi Az,\
    Percent Progress,Port,Preferred Backup Window,Preferred Maintenance Window,\
    Reader Endpoint,Replication Source Identifier,Storage Encrypted,Associated Roles,\
    Availability Zones,Enabled Cloudwatch Logs Exports,Members,Read Replica Identifiers,\
    Vpc Security Groups,Tags Src,Tags,Title,Akas,Partition,Region,Account ID,\
    Sp Connection Name,Sp Ctx,Ctx";

const DOCDBINSTANCE_HEADER: &str = "Db Instance Identifier,Db Instance Arn,Db Cluster Identifier,Db Instance Status,\
    Db Instance Class,Dbi Resource ID,Availability Zone,Backup Retention Period,\
    Ca Certificate Identifier,Copy Tags To Snapshot,Db Subnet Group Arn,\
    Db Subnet Group Description,Db Subnet Group Name,Db Subnet Group Status,\
    Endpoint Address,Endpoint Hosted Zone ID,Endpoint Port,Engine,Engine Version,\
    Instance Create Time,Kms Key ID,Latest Restorable Time,Preferred Backup Window,\
    Preferred Maintenance Window,Promotion Tier,Publicly Accessible,Storage Encrypted,\
    Vpc ID,Enabled Cloudwatch Logs Exports,Pending Modified Values,Status Infos,Subnets,\
    Vpc Security Groups,Tags Src,Tags,Title,Akas,Partition,Region,Account ID,\
    Sp Connection Name,Sp Ctx,Ctx";

const EC_HEADER: &str = "Cache Cluster ID,Arn,Cache Node Type,Cache Cluster Status,\
    At Rest Encryption Enabled,Auth Token Enabled,Auto Minor Version Upgrade,\
    Cache Cluster Create Time,Cache Subnet Group Name,Client Download Landing Page,\
    Engine,Engine Version,Num Cache Nodes,Preferred Availability Zone,\
    Preferred Maintenance Window,Replication Group ID,Snapshot Retention Limit,\
    Snapshot Window,Transit Encryption Enabled,Auth Token Last Modified Date,\
    IP Discovery,Network Type,Preferred Outpost Arn,\
    Replication Group Log Delivery Enabled,Transit Encryption Mode,\
    Cache Parameter Group,Notification Configuration,Pending Modified Values,\
    Security Groups,Configuration Endpoint,Cache Nodes,Cache Security Groups,\
    Log Delivery Configurations,Tags Src,Title,Tags,Akas,Partition,Region,Account ID,\
    Sp Connection Name,Sp Ctx,Ctx";

const ECREP_HEADER: &str = "Replication Group ID,Arn,Description,At Rest Encryption Enabled,Kms Key ID,\
    Auth Token Enabled,Auth Token Last Modified Date,Automatic Failover,Cache Node Type,\
    Cluster Enabled,Multi Az,Snapshot Retention Limit,Snapshot Window,\
    Snapshotting Cluster ID,Status,Transit Encryption Enabled,Configuration Endpoint,\
    Global Replication Group Info,Member Clusters,Member Clusters Outpost Arns,\
    Node Groups,Pending Modified Values,User Group Ids,Title,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";

const EC2_HEADER: &str = "Instance ID,Arn,Instance Type,Instance State,Monitoring State,\
    Disable Api Termination,Ami Launch Index,Architecture,Boot Mode,\
    Capacity Reservation ID,Capacity Reservation Specification,Client Token,\
    Cpu Options Core Count,Cpu Options Threads Per Core,Ebs Optimized,Ena Support,\
    Hypervisor,Iam Instance Profile Arn,Iam Instance Profile ID,Image ID,\
    Instance Initiated Shutdown Behavior,Instance Lifecycle,Kernel ID,Key Name,\
    Launch Time,Outpost Arn,Placement Affinity,Placement Availability Zone,\
    Placement Group ID,Placement Group Name,Placement Host ID,\
    Placement Host Resource Group Arn,Placement Partition Number,Placement Tenancy,\
    Platform,Platform Details,Private IP Address,Private Dns Name,Public Dns Name,\
    Public IP Address,Ram Disk ID,Root Device Name,Root Device Type,Source Dest Check,\
    Spot Instance Request ID,Sriov Net Support,State Code,State Transition Reason,\
    State Transition Time,Subnet ID,Tpm Support,Usage Operation,\
    Usage Operation Update Time,User Data,Virtualization Type,Vpc ID,\
    Block Device Mappings,Elastic Gpu Associations,\
    Elastic Inference Accelerator Associations,Enclave Options,Hibernation Options,\
    Launch Template Data,Licenses,Maintenance Options,Metadata Options,\
    Network Interfaces,Private Dns Name Options,Product Codes,Security Groups,\
    Instance Status,Tags Src,Title,Tags,Akas,Partition,Region,Account ID,\
    Sp Connection Name,Sp Ctx,Ctx";

const IAMGROUP_HEADER: &str = "Name,Group ID,Path,Arn,Create Date,Inline Policies,Inline Policies Std,\
    Attached Policy Arns,Users,Title,Akas,Partition,Region,Account ID,\
    Sp Connection Name,Sp Ctx,Ctx";

const IAMROLE_HEADER: &str = "Name,Arn,Role ID,Create Date,Description,Instance Profile Arns,Max Session Duration,\
    Path,Permissions Boundary Arn,Permissions Boundary Type,Role Last Used Date,\
    Role Last Used Region,Tags Src,Inline Policies,Inline Policies Std,\
    Attached Policy Arns,Assume Role Policy,Assume Role Policy Std,Title,Tags,Akas,\
    Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const IAMUSER_HEADER: &str = "Name,User ID,Path,Arn,Create Date,Password Last Used,Permissions Boundary Arn,\
    Permissions Boundary Type,Mfa Enabled,Login Profile,Mfa Devices,Groups,\
    Inline Policies,Inline Policies Std,Attached Policy Arns,Tags Src,Tags,Title,Akas,\
    Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const NACLS_HEADER: &str = "Network Acl ID,Arn,Is Default,Vpc ID,Owner ID,Associations,Entries,Tags Src,Tags,\
    Title,Akas,Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const RT_HEADER: &str = "Route Table ID,Vpc ID,Owner ID,Associations,Routes,Propagating Vgws,Tags Src,Tags,\
    Title,Akas,Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const S3_HEADER: &str = "Name,Arn,Creation Date,Bucket Policy Is Public,Versioning Enabled,\
    Versioning Mfa Delete,Block Public Acls,Block Public Policy,Ignore Public Acls,\
    Restrict Public Buckets,Event Notification Configuration,\
    Server Side Encryption Configuration,Acl,Lifecycle Rules,Logging,\
    Object Lock Configuration,Object Ownership Controls,Policy,Policy Std,Replication,\
    Website Configuration,Tags Src,Tags,Title,Akas,Region,Partition,Account ID,\
    Sp Connection Name,Sp Ctx,Ctx";

const SG_HEADER: &str = "Group Name,Group ID,Arn,Description,Vpc ID,Owner ID,IP Permissions,\
    IP Permissions Egress,Tags Src,Tags,Title,Akas,Partition,Region,Account ID,\
    Sp Connection Name,Sp Ctx,Ctx";

const SGRULE_HEADER: &str = "Security Group Rule ID,Group Name,Group ID,Is Egress,Type,Vpc ID,Owner ID,\
    Group Owner ID,Description,IP Protocol,From Port,To Port,Cidr IP,Cidr Ipv4,\
    Cidr Ipv6,Pair Group ID,Referenced Group ID,Pair Group Name,Pair Peering Status,\
    Referenced Peering Status,Pair User ID,Referenced User ID,Pair Vpc ID,\
    Referenced Vpc ID,Pair Vpc Peering Connection ID,\
    Referenced Vpc Peering Connection ID,Prefix List ID,Title,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";

const SUBNET_HEADER: &str = "Subnet ID,Subnet Arn,Vpc ID,Cidr Block,State,Owner ID,\
    Assign Ipv6 Address On Creation,Available IP Address Count,Availability Zone,\
    Availability Zone ID,Customer Owned Ipv4 Pool,Default For Az,\
    Map Customer Owned IP On Launch,Map Public IP On Launch,Outpost Arn,\
    Ipv6 Cidr Block Association Set,Tags Src,Tags,Title,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";

const TG_HEADER: &str = "Target Group Name,Target Group Arn,Target Type,Load Balancer Arns,Port,Vpc ID,\
    Protocol,Matcher Http Code,Matcher Grpc Code,Healthy Threshold Count,\
    Unhealthy Threshold Count,Health Check Enabled,Health Check Interval Seconds,\
    Health Check Path,Health Check Port,Health Check Protocol,\
    Health Check Timeout Seconds,Target Health Descriptions,Tags Src,Title,Tags,Akas,\
    Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const VPC_HEADER: &str = "Vpc ID,Arn,Cidr Block,State,Is Default,Dhcp Options ID,Instance Tenancy,Owner ID,\
    Cidr Block Association Set,Ipv6 Cidr Block Association Set,Tags Src,Title,Tags,Akas,\
    Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const VPCIGW_HEADER: &str = "Internet Gateway ID,Owner ID,Attachments,Tags Src,Tags,Title,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";

const TGW_HEADER: &str = "Transit Gateway ID,Transit Gateway Arn,State,Owner ID,Description,Creation Time,\
    Amazon Side Asn,Association Default Route Table ID,Auto Accept Shared Attachments,\
    Default Route Table Association,Default Route Table Propagation,Dns Support,\
    Multicast Support,Propagation Default Route Table ID,Vpn Ecmp Support,Cidr Blocks,\
    Tags Src,Tags,Title,Akas,Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const RDSCLUSTER_HEADER: &str = "Db Cluster Identifier,Arn,Status,Resource ID,Create Time,\
    Activity Stream Kinesis Stream Name,Activity Stream Kms Key ID,Activity Stream Mode,\
    Activity Stream Status,Allocated Storage,Auto Minor Version Upgrade,\
    Backtrack Consumed Change Records,Backtrack Window,Backup Retention Period,Capacity,\
    Character Set Name,Clone Group ID,Copy Tags To Snapshot,Cross Account Clone,\
    Database Name,Db Cluster Parameter Group,Db Subnet Group,Deletion Protection,\
    Earliest Backtrack Time,Earliest Restorable Time,Endpoint,Engine,Engine Mode,\
    Engine Version,Global Write Forwarding Requested,Global Write Forwarding Status,\
    Hosted Zone ID,Http Endpoint Enabled,Iam Database Authentication Enabled,Kms Key ID,\
    Latest Restorable Time,Master User Name,Multi Az,Percent Progress,Port,\
    Preferred Backup Window,Preferred Maintenance Window,Reader Endpoint,\
    Storage Encrypted,Associated Roles,Availability Zones,Custom Endpoints,Members,\
    Option Group Memberships,Domain Memberships,Enabled Cloudwatch Logs Exports,\
    Pending Maintenance Actions,Read Replica Identifiers,Vpc Security Groups,Tags Src,\
    Tags,Title,Akas,Partition,Region,Account ID,Sp Connection Name,Sp Ctx,Ctx";

const RDSINSTANCE_HEADER: &str = "Db Instance Identifier,Arn,Db Cluster Identifier,Status,Class,Resource ID,\
    Allocated Storage,Auto Minor Version Upgrade,Availability Zone,\
    Backup Retention Period,Ca Certificate Identifier,Character Set Name,\
    Copy Tags To Snapshot,Customer Owned IP Enabled,Port,Db Name,Db Subnet Group Arn,\
    Db Subnet Group Description,Db Subnet Group Name,Db Subnet Group Status,\
    Deletion Protection,Endpoint Address,Endpoint Hosted Zone ID,Endpoint Port,Engine,\
    Engine Version,Enhanced Monitoring Resource Arn,Iam Database Authentication Enabled,\
    Create Time,Iops,Kms Key ID,Latest Restorable Time,License Model,Master User Name,\
    Max Allocated Storage,Monitoring Interval,Monitoring Role Arn,Multi Az,\
    Nchar Character Set Name,Performance Insights Enabled,\
    Performance Insights Kms Key ID,Performance Insights Retention Period,\
    Preferred Backup Window,Preferred Maintenance Window,Promotion Tier,\
    Publicly Accessible,Read Replica Source Db Instance Identifier,Replica Mode,\
    Secondary Availability Zone,Storage Encrypted,Storage Throughput,Storage Type,\
    Tde Credential Arn,Timezone,Vpc ID,Associated Roles,Certificate,Db Parameter Groups,\
    Db Security Groups,Domain Memberships,Enabled Cloudwatch Logs Exports,\
    Option Group Memberships,Pending Maintenance Actions,Processor Features,\
    Read Replica Db Cluster Identifiers,Read Replica Db Instance Identifiers,\
    Status Infos,Subnets,Vpc Security Groups,Tags Src,Tags,Title,Akas,Partition,Region,\
    Account ID,Sp Connection Name,Sp Ctx,Ctx";
