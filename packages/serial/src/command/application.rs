use zwave_core::submodule;

submodule!(application_update);
submodule!(serial_api_started);
