use zwave_core::submodule;

submodule!(get_node_protocol_info);
submodule!(get_suc_node_id);
submodule!(request_node_info);
submodule!(set_suc_node_id);
