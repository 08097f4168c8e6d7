mod class_name_round_trip;
