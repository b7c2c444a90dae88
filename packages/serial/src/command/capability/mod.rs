use zwave_core::submodule;

submodule!(get_controller_capabilities);
submodule!(get_controller_id);
submodule!(get_controller_version);
submodule!(get_protocol_version);
submodule!(get_serial_api_capabilities);
submodule!(get_serial_api_init_data);
submodule!(serial_api_setup);
