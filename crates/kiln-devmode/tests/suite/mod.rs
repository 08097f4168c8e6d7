mod staleness_scenario;
