mod beam;
pub use beam::*;

mod chip_type;
pub use chip_type::*;

mod command_classes;
pub use command_classes::*;

mod command_type;
pub use command_type::*;

mod controller_role;
pub use controller_role::*;

mod data_rate;
pub use data_rate::*;

mod device_fingerprint;
pub use device_fingerprint::*;

mod device_type;
pub use device_type::*;

mod endpoint_index;
pub use endpoint_index::*;

mod frame_info;
pub use frame_info::*;

mod function_type;
pub use function_type::*;

mod id;
pub use id::*;

mod message_origin;
pub use message_origin::*;

mod node_id;
pub use node_id::*;

mod node_id_type;
pub use node_id_type::*;

mod node_info;
pub use node_info::*;

mod node_type;
pub use node_type::*;

mod powerlevel;
pub use powerlevel::*;

mod protocol_type;
pub use protocol_type::*;

mod protocol_version;
pub use protocol_version::*;

mod rf_region;
pub use rf_region::*;

mod routing_scheme;
pub use routing_scheme::*;

mod rssi;
pub use rssi::*;

mod sdk_version;
pub use sdk_version::*;

mod serial_api_wakeup_reason;
pub use serial_api_wakeup_reason::*;

mod transmit_options;
pub use transmit_options::*;

mod transmit_report;
pub use transmit_report::*;

mod transmit_status;
pub use transmit_status::*;

mod version;
pub use version::*;

mod zwave_api_version;
pub use zwave_api_version::*;

mod zwave_library_type;
pub use zwave_library_type::*;
