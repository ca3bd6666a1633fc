mod roster_tests;
