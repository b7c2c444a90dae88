use zwave_core::submodule;

submodule!(get_background_rssi);
submodule!(set_rf_receive_mode);
submodule!(soft_reset);
