mod full_build;
