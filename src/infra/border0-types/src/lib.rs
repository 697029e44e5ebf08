mod connector;
mod policy;
mod service_account;
mod session;
mod socket;

pub use connector::{Connector, ConnectorToken, NewConnector, NewConnectorToken};
pub use policy::{
    NewPolicy, Policy, PolicyCondition, PolicyData, PolicyPermissions, PolicyWho, SshPermissions,
    POLICY_VERSION_V2,
};
pub use service_account::{
    NewServiceAccount, NewServiceAccountToken, ServiceAccount, ServiceAccountRole,
    ServiceAccountToken,
};
pub use session::{
    Recording, RecordingData, SessionLog, SessionLogPage, SessionLogType, ASCIINEMA_RECORDING_TYPE,
};
pub use socket::{NewSocket, Socket};
